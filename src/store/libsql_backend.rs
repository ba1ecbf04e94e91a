//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Each trait method is a
//! single statement (or a read + assemble), so evidence mutations are
//! atomic without explicit transactions.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::onboarding::record::{
    Availability, ConsultationType, Document, DocumentType, ExpertiseArea, KycStatus,
    PaymentMethod, PaymentMethodRecord, PortfolioItem, ProfessionalRecord, ProfileDetails,
    VerificationStatus, VideoKyc,
};
use crate::onboarding::step::OnboardingStep;
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_optional_datetime(s: &Option<String>) -> Option<DateTime<Utc>> {
    s.as_ref().map(|s| parse_datetime(s))
}

/// Parse a stored "HH:MM:SS" (or "HH:MM") time-of-day.
fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .unwrap_or(NaiveTime::MIN)
}

fn time_to_str(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

fn step_to_str(step: OnboardingStep) -> String {
    step.to_string()
}

fn str_to_step(s: &str) -> OnboardingStep {
    s.parse().unwrap_or_default()
}

fn verification_to_str(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::Pending => "PENDING",
        VerificationStatus::Verified => "VERIFIED",
        VerificationStatus::Rejected => "REJECTED",
    }
}

fn str_to_verification(s: &str) -> VerificationStatus {
    match s {
        "VERIFIED" => VerificationStatus::Verified,
        "REJECTED" => VerificationStatus::Rejected,
        _ => VerificationStatus::Pending,
    }
}

fn kyc_status_to_str(status: KycStatus) -> &'static str {
    match status {
        KycStatus::NotStarted => "NOT_STARTED",
        KycStatus::Submitted => "SUBMITTED",
        KycStatus::Verified => "VERIFIED",
        KycStatus::Rejected => "REJECTED",
    }
}

fn str_to_kyc_status(s: &str) -> KycStatus {
    match s {
        "SUBMITTED" => KycStatus::Submitted,
        "VERIFIED" => KycStatus::Verified,
        "REJECTED" => KycStatus::Rejected,
        _ => KycStatus::NotStarted,
    }
}

fn doc_type_to_str(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::GovernmentId => "GOVERNMENT_ID",
        DocumentType::Passport => "PASSPORT",
        DocumentType::DrivingLicense => "DRIVING_LICENSE",
        DocumentType::ProfessionalLicense => "PROFESSIONAL_LICENSE",
        DocumentType::DegreeCertificate => "DEGREE_CERTIFICATE",
        DocumentType::Other => "OTHER",
    }
}

fn str_to_doc_type(s: &str) -> DocumentType {
    match s {
        "GOVERNMENT_ID" => DocumentType::GovernmentId,
        "PASSPORT" => DocumentType::Passport,
        "DRIVING_LICENSE" => DocumentType::DrivingLicense,
        "PROFESSIONAL_LICENSE" => DocumentType::ProfessionalLicense,
        "DEGREE_CERTIFICATE" => DocumentType::DegreeCertificate,
        _ => DocumentType::Other,
    }
}

fn expertise_to_str(area: ExpertiseArea) -> &'static str {
    match area {
        ExpertiseArea::CriminalLawyer => "CRIMINAL_LAWYER",
        ExpertiseArea::CorporateLawyer => "CORPORATE_LAWYER",
        ExpertiseArea::FamilyLawyer => "FAMILY_LAWYER",
        ExpertiseArea::RealEstateLawyer => "REAL_ESTATE_LAWYER",
        ExpertiseArea::ImmigrationLawyer => "IMMIGRATION_LAWYER",
        ExpertiseArea::PersonalInjuryLawyer => "PERSONAL_INJURY_LAWYER",
        ExpertiseArea::IntellectualPropertyLawyer => "INTELLECTUAL_PROPERTY_LAWYER",
        ExpertiseArea::TaxLawyer => "TAX_LAWYER",
        ExpertiseArea::EmploymentLawyer => "EMPLOYMENT_LAWYER",
        ExpertiseArea::EnvironmentalLawyer => "ENVIRONMENTAL_LAWYER",
        ExpertiseArea::Other => "OTHER",
    }
}

fn str_to_expertise(s: &str) -> ExpertiseArea {
    match s {
        "CRIMINAL_LAWYER" => ExpertiseArea::CriminalLawyer,
        "CORPORATE_LAWYER" => ExpertiseArea::CorporateLawyer,
        "FAMILY_LAWYER" => ExpertiseArea::FamilyLawyer,
        "REAL_ESTATE_LAWYER" => ExpertiseArea::RealEstateLawyer,
        "IMMIGRATION_LAWYER" => ExpertiseArea::ImmigrationLawyer,
        "PERSONAL_INJURY_LAWYER" => ExpertiseArea::PersonalInjuryLawyer,
        "INTELLECTUAL_PROPERTY_LAWYER" => ExpertiseArea::IntellectualPropertyLawyer,
        "TAX_LAWYER" => ExpertiseArea::TaxLawyer,
        "EMPLOYMENT_LAWYER" => ExpertiseArea::EmploymentLawyer,
        "ENVIRONMENTAL_LAWYER" => ExpertiseArea::EnvironmentalLawyer,
        _ => ExpertiseArea::Other,
    }
}

fn consultation_type_to_str(kind: ConsultationType) -> &'static str {
    match kind {
        ConsultationType::Video => "VIDEO",
        ConsultationType::Audio => "AUDIO",
        ConsultationType::Both => "BOTH",
    }
}

fn str_to_consultation_type(s: &str) -> ConsultationType {
    match s {
        "VIDEO" => ConsultationType::Video,
        "AUDIO" => ConsultationType::Audio,
        _ => ConsultationType::Both,
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn opt_integer(n: Option<u32>) -> libsql::Value {
    match n {
        Some(n) => libsql::Value::Integer(n as i64),
        None => libsql::Value::Null,
    }
}

// ── Row mappers ─────────────────────────────────────────────────────

/// Column order matches DOCUMENT_COLUMNS:
/// 0:id, 1:document_type, 2:file_ref, 3:status, 4:uploaded_at, 5:verified_at
fn row_to_document(row: &libsql::Row) -> Result<Document, libsql::Error> {
    let id_str: String = row.get(0)?;
    let type_str: String = row.get(1)?;
    let status_str: String = row.get(3)?;
    let uploaded_str: String = row.get(4)?;
    let verified_str: Option<String> = row.get(5).ok();

    Ok(Document {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        document_type: str_to_doc_type(&type_str),
        file_ref: row.get(2)?,
        status: str_to_verification(&status_str),
        uploaded_at: parse_datetime(&uploaded_str),
        verified_at: parse_optional_datetime(&verified_str),
    })
}

/// 0:status, 1:session_ref, 2:submitted_at, 3:verified_at
fn row_to_kyc(row: &libsql::Row) -> Result<VideoKyc, libsql::Error> {
    let status_str: String = row.get(0)?;
    let submitted_str: Option<String> = row.get(2).ok();
    let verified_str: Option<String> = row.get(3).ok();

    Ok(VideoKyc {
        status: str_to_kyc_status(&status_str),
        session_ref: row.get(1).ok(),
        submitted_at: parse_optional_datetime(&submitted_str),
        verified_at: parse_optional_datetime(&verified_str),
    })
}

/// 0:id, 1:name, 2:artifact_ref, 3:no_artifact, 4:created_at
fn row_to_portfolio_item(row: &libsql::Row) -> Result<PortfolioItem, libsql::Error> {
    let id_str: String = row.get(0)?;
    let no_artifact: i64 = row.get(3)?;
    let created_str: String = row.get(4)?;

    Ok(PortfolioItem {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        name: row.get(1)?,
        artifact_ref: row.get(2).ok(),
        no_artifact: no_artifact != 0,
        created_at: parse_datetime(&created_str),
    })
}

/// 0..6: day flags Monday..Sunday, 7:from_time, 8:to_time,
/// 9:consultation_type, 10:duration_minutes
fn row_to_availability(row: &libsql::Row) -> Result<Availability, libsql::Error> {
    let day = |idx: i32| -> Result<bool, libsql::Error> {
        let v: i64 = row.get(idx)?;
        Ok(v != 0)
    };
    let from_str: String = row.get(7)?;
    let to_str: String = row.get(8)?;
    let type_str: String = row.get(9)?;
    let duration: i64 = row.get(10)?;

    Ok(Availability {
        monday: day(0)?,
        tuesday: day(1)?,
        wednesday: day(2)?,
        thursday: day(3)?,
        friday: day(4)?,
        saturday: day(5)?,
        sunday: day(6)?,
        from_time: parse_time(&from_str),
        to_time: parse_time(&to_str),
        consultation_type: str_to_consultation_type(&type_str),
        consultation_duration_minutes: duration.max(0) as u32,
    })
}

/// 0:id, 1:kind, 2:account_holder_name, 3:bank_name, 4:account_number,
/// 5:ifsc_code, 6:wallet_provider, 7:wallet_phone, 8:created_at
fn row_to_payment_method(row: &libsql::Row) -> Result<PaymentMethodRecord, libsql::Error> {
    let id_str: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let created_str: String = row.get(8)?;

    let method = if kind == "BANK_ACCOUNT" {
        PaymentMethod::BankAccount {
            account_holder_name: row.get::<String>(2).unwrap_or_default(),
            bank_name: row.get::<String>(3).unwrap_or_default(),
            account_number: row.get::<String>(4).unwrap_or_default(),
            ifsc_code: row.get::<String>(5).unwrap_or_default(),
        }
    } else {
        PaymentMethod::DigitalWallet {
            wallet_provider: row.get::<String>(6).unwrap_or_default(),
            wallet_phone_number: row.get::<String>(7).unwrap_or_default(),
        }
    };

    Ok(PaymentMethodRecord {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        method,
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const PROFESSIONAL_COLUMNS: &str = "current_step, completed_steps, onboarding_completed, \
     area_of_expertise, years_of_experience, bio, location, picture_ref, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, document_type, file_ref, status, uploaded_at, verified_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn get_record(
        &self,
        professional_id: Uuid,
    ) -> Result<Option<ProfessionalRecord>, DatabaseError> {
        let conn = self.conn();
        let id = professional_id.to_string();

        let mut rows = conn
            .query(
                &format!("SELECT {PROFESSIONAL_COLUMNS} FROM professionals WHERE id = ?1"),
                params![id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load professional: {e}")))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read professional: {e}")))?
        else {
            return Ok(None);
        };

        let step_str: String = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("Bad current_step column: {e}")))?;
        let completed_json: String = row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("Bad completed_steps column: {e}")))?;
        let completed_flag: i64 = row
            .get(2)
            .map_err(|e| DatabaseError::Query(format!("Bad onboarding_completed column: {e}")))?;
        let expertise_str: Option<String> = row.get(3).ok();
        let years: Option<i64> = row.get(4).ok();
        let created_str: String = row
            .get(8)
            .map_err(|e| DatabaseError::Query(format!("Bad created_at column: {e}")))?;
        let updated_str: String = row
            .get(9)
            .map_err(|e| DatabaseError::Query(format!("Bad updated_at column: {e}")))?;

        let completed_steps: BTreeSet<OnboardingStep> =
            serde_json::from_str(&completed_json).unwrap_or_default();

        let profile = ProfileDetails {
            area_of_expertise: expertise_str.as_deref().map(str_to_expertise),
            years_of_experience: years.map(|y| y.max(0) as u32),
            bio: row.get(5).ok(),
            location: row.get(6).ok(),
            picture_ref: row.get(7).ok(),
        };

        // Evidence collections
        let mut documents = Vec::new();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents \
                     WHERE professional_id = ?1 ORDER BY uploaded_at, id"
                ),
                params![id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load documents: {e}")))?;
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read document: {e}")))?
        {
            documents.push(
                row_to_document(&row)
                    .map_err(|e| DatabaseError::Query(format!("Bad document row: {e}")))?,
            );
        }

        let mut rows = conn
            .query(
                "SELECT status, session_ref, submitted_at, verified_at \
                 FROM video_kyc WHERE professional_id = ?1",
                params![id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load video KYC: {e}")))?;
        let video_kyc = match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read video KYC: {e}")))?
        {
            Some(row) => row_to_kyc(&row)
                .map_err(|e| DatabaseError::Query(format!("Bad video KYC row: {e}")))?,
            None => VideoKyc::default(),
        };

        let mut portfolio_items = Vec::new();
        let mut rows = conn
            .query(
                "SELECT id, name, artifact_ref, no_artifact, created_at \
                 FROM portfolio_items WHERE professional_id = ?1 ORDER BY created_at, id",
                params![id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load portfolio: {e}")))?;
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read portfolio item: {e}")))?
        {
            portfolio_items.push(
                row_to_portfolio_item(&row)
                    .map_err(|e| DatabaseError::Query(format!("Bad portfolio row: {e}")))?,
            );
        }

        let mut rows = conn
            .query(
                "SELECT monday, tuesday, wednesday, thursday, friday, saturday, sunday, \
                        from_time, to_time, consultation_type, duration_minutes \
                 FROM availability WHERE professional_id = ?1",
                params![id.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load availability: {e}")))?;
        let availability = match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read availability: {e}")))?
        {
            Some(row) => Some(
                row_to_availability(&row)
                    .map_err(|e| DatabaseError::Query(format!("Bad availability row: {e}")))?,
            ),
            None => None,
        };

        let mut payment_methods = Vec::new();
        let mut rows = conn
            .query(
                "SELECT id, kind, account_holder_name, bank_name, account_number, ifsc_code, \
                        wallet_provider, wallet_phone, created_at \
                 FROM payment_methods WHERE professional_id = ?1 ORDER BY created_at, id",
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to load payment methods: {e}")))?;
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read payment method: {e}")))?
        {
            payment_methods.push(
                row_to_payment_method(&row)
                    .map_err(|e| DatabaseError::Query(format!("Bad payment method row: {e}")))?,
            );
        }

        Ok(Some(ProfessionalRecord {
            professional_id,
            current_step: str_to_step(&step_str),
            completed_steps,
            onboarding_completed: completed_flag != 0,
            profile,
            documents,
            video_kyc,
            portfolio_items,
            availability,
            payment_methods,
            created_at: parse_datetime(&created_str),
            updated_at: parse_datetime(&updated_str),
        }))
    }

    async fn ensure_record(
        &self,
        professional_id: Uuid,
    ) -> Result<ProfessionalRecord, DatabaseError> {
        if let Some(record) = self.get_record(professional_id).await? {
            return Ok(record);
        }

        let now = Utc::now();
        let record = ProfessionalRecord::new(professional_id, now);
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO professionals \
                 (id, current_step, completed_steps, onboarding_completed, created_at, updated_at) \
                 VALUES (?1, ?2, '[]', 0, ?3, ?4)",
                params![
                    professional_id.to_string(),
                    step_to_str(record.current_step),
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to create record: {e}")))?;
        Ok(record)
    }

    async fn save_progress(
        &self,
        professional_id: Uuid,
        current_step: OnboardingStep,
        completed_steps: &BTreeSet<OnboardingStep>,
        onboarding_completed: bool,
    ) -> Result<(), DatabaseError> {
        let completed_json = serde_json::to_string(completed_steps)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.conn()
            .execute(
                "UPDATE professionals \
                 SET current_step = ?1, completed_steps = ?2, onboarding_completed = ?3, \
                     updated_at = ?4 \
                 WHERE id = ?5",
                params![
                    step_to_str(current_step),
                    completed_json,
                    onboarding_completed as i64,
                    Utc::now().to_rfc3339(),
                    professional_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to save progress: {e}")))?;
        Ok(())
    }

    async fn save_profile(
        &self,
        professional_id: Uuid,
        profile: &ProfileDetails,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE professionals \
                 SET area_of_expertise = ?1, years_of_experience = ?2, bio = ?3, \
                     location = ?4, picture_ref = ?5, updated_at = ?6 \
                 WHERE id = ?7",
                params![
                    opt_text(profile.area_of_expertise.map(expertise_to_str)),
                    opt_integer(profile.years_of_experience),
                    opt_text(profile.bio.as_deref()),
                    opt_text(profile.location.as_deref()),
                    opt_text(profile.picture_ref.as_deref()),
                    Utc::now().to_rfc3339(),
                    professional_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to save profile: {e}")))?;
        Ok(())
    }

    async fn insert_document(
        &self,
        professional_id: Uuid,
        document: &Document,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO documents \
                 (id, professional_id, document_type, file_ref, status, uploaded_at, verified_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    document.id.to_string(),
                    professional_id.to_string(),
                    doc_type_to_str(document.document_type),
                    document.file_ref.clone(),
                    verification_to_str(document.status),
                    document.uploaded_at.to_rfc3339(),
                    opt_text(document.verified_at.map(|t| t.to_rfc3339()).as_deref()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to insert document: {e}")))?;
        Ok(())
    }

    async fn set_document_status(
        &self,
        professional_id: Uuid,
        document_id: Uuid,
        status: VerificationStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE documents SET status = ?1, verified_at = ?2 \
                 WHERE id = ?3 AND professional_id = ?4",
                params![
                    verification_to_str(status),
                    opt_text(verified_at.map(|t| t.to_rfc3339()).as_deref()),
                    document_id.to_string(),
                    professional_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to update document status: {e}")))?;
        Ok(affected > 0)
    }

    async fn upsert_video_kyc(
        &self,
        professional_id: Uuid,
        kyc: &VideoKyc,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO video_kyc \
                 (professional_id, status, session_ref, submitted_at, verified_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    professional_id.to_string(),
                    kyc_status_to_str(kyc.status),
                    opt_text(kyc.session_ref.as_deref()),
                    opt_text(kyc.submitted_at.map(|t| t.to_rfc3339()).as_deref()),
                    opt_text(kyc.verified_at.map(|t| t.to_rfc3339()).as_deref()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to upsert video KYC: {e}")))?;
        Ok(())
    }

    async fn set_video_kyc_status(
        &self,
        professional_id: Uuid,
        status: KycStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE video_kyc SET status = ?1, verified_at = ?2 WHERE professional_id = ?3",
                params![
                    kyc_status_to_str(status),
                    opt_text(verified_at.map(|t| t.to_rfc3339()).as_deref()),
                    professional_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to update video KYC: {e}")))?;
        Ok(affected > 0)
    }

    async fn insert_portfolio_item(
        &self,
        professional_id: Uuid,
        item: &PortfolioItem,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO portfolio_items \
                 (id, professional_id, name, artifact_ref, no_artifact, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.id.to_string(),
                    professional_id.to_string(),
                    item.name.clone(),
                    opt_text(item.artifact_ref.as_deref()),
                    item.no_artifact as i64,
                    item.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to insert portfolio item: {e}")))?;
        Ok(())
    }

    async fn upsert_availability(
        &self,
        professional_id: Uuid,
        availability: &Availability,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO availability \
                 (professional_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday, \
                  from_time, to_time, consultation_type, duration_minutes, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    professional_id.to_string(),
                    availability.monday as i64,
                    availability.tuesday as i64,
                    availability.wednesday as i64,
                    availability.thursday as i64,
                    availability.friday as i64,
                    availability.saturday as i64,
                    availability.sunday as i64,
                    time_to_str(availability.from_time),
                    time_to_str(availability.to_time),
                    consultation_type_to_str(availability.consultation_type),
                    availability.consultation_duration_minutes as i64,
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to upsert availability: {e}")))?;
        Ok(())
    }

    async fn insert_payment_method(
        &self,
        professional_id: Uuid,
        method: &PaymentMethodRecord,
    ) -> Result<(), DatabaseError> {
        let (kind, holder, bank, account, ifsc, provider, phone) = match &method.method {
            PaymentMethod::BankAccount {
                account_holder_name,
                bank_name,
                account_number,
                ifsc_code,
            } => (
                "BANK_ACCOUNT",
                Some(account_holder_name.as_str()),
                Some(bank_name.as_str()),
                Some(account_number.as_str()),
                Some(ifsc_code.as_str()),
                None,
                None,
            ),
            PaymentMethod::DigitalWallet {
                wallet_provider,
                wallet_phone_number,
            } => (
                "DIGITAL_WALLET",
                None,
                None,
                None,
                None,
                Some(wallet_provider.as_str()),
                Some(wallet_phone_number.as_str()),
            ),
        };

        self.conn()
            .execute(
                "INSERT INTO payment_methods \
                 (id, professional_id, kind, account_holder_name, bank_name, account_number, \
                  ifsc_code, wallet_provider, wallet_phone, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    method.id.to_string(),
                    professional_id.to_string(),
                    kind,
                    opt_text(holder),
                    opt_text(bank),
                    opt_text(account),
                    opt_text(ifsc),
                    opt_text(provider),
                    opt_text(phone),
                    method.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to insert payment method: {e}")))?;
        Ok(())
    }
}

//! Professional onboarding record and its evidence collections.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::OnboardingStep;

/// Admin verdict state for an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// Video-KYC lifecycle state. Submission and verification are separate
/// events: the professional submits, an admin verdict moves it to
/// Verified or Rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    NotStarted,
    Submitted,
    Verified,
    Rejected,
}

impl Default for KycStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Submitted => "SUBMITTED",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// Accepted identity/credential document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    GovernmentId,
    Passport,
    DrivingLicense,
    ProfessionalLicense,
    DegreeCertificate,
    Other,
}

/// Practice areas a professional can register under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpertiseArea {
    CriminalLawyer,
    CorporateLawyer,
    FamilyLawyer,
    RealEstateLawyer,
    ImmigrationLawyer,
    PersonalInjuryLawyer,
    IntellectualPropertyLawyer,
    TaxLawyer,
    EmploymentLawyer,
    EnvironmentalLawyer,
    Other,
}

/// How consultations are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultationType {
    Video,
    Audio,
    Both,
}

/// An uploaded verification document. The file itself lives out-of-band;
/// only the reference is recorded here. Rejected documents are retained
/// for audit — replacements are new entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub document_type: DocumentType,
    pub file_ref: String,
    pub status: VerificationStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

/// The single video-KYC record for a professional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoKyc {
    pub status: KycStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

/// A portfolio entry. Either carries an artifact reference or an explicit
/// declaration that none is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<String>,
    pub no_artifact: bool,
    pub created_at: DateTime<Utc>,
}

/// Weekly availability window for consultations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub consultation_type: ConsultationType,
    pub consultation_duration_minutes: u32,
}

impl Availability {
    /// Names of the days flagged available, Monday first.
    pub fn selected_days(&self) -> Vec<&'static str> {
        [
            ("Monday", self.monday),
            ("Tuesday", self.tuesday),
            ("Wednesday", self.wednesday),
            ("Thursday", self.thursday),
            ("Friday", self.friday),
            ("Saturday", self.saturday),
            ("Sunday", self.sunday),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }

    pub fn any_day_selected(&self) -> bool {
        !self.selected_days().is_empty()
    }
}

/// A registered payout destination. Exactly one kind per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankAccount {
        account_holder_name: String,
        bank_name: String,
        account_number: String,
        ifsc_code: String,
    },
    DigitalWallet {
        wallet_provider: String,
        wallet_phone_number: String,
    },
}

/// A stored payment method with its identity and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// Profile fields collected during the Profile step. All optional until
/// the step guard checks completeness; the picture never becomes required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_of_expertise: Option<ExpertiseArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_ref: Option<String>,
}

impl ProfileDetails {
    /// Human-readable names of the required fields still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.area_of_expertise.is_none() {
            missing.push("Area Of Expertise");
        }
        if self.years_of_experience.is_none() {
            missing.push("Years Of Experience");
        }
        if self.bio.as_deref().is_none_or(|b| b.trim().is_empty()) {
            missing.push("Bio");
        }
        if self.location.as_deref().is_none_or(|l| l.trim().is_empty()) {
            missing.push("Location");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// One professional's full onboarding state: progression plus the evidence
/// collections the guards evaluate. Never deleted; retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalRecord {
    pub professional_id: Uuid,
    pub current_step: OnboardingStep,
    pub completed_steps: BTreeSet<OnboardingStep>,
    pub onboarding_completed: bool,
    pub profile: ProfileDetails,
    pub documents: Vec<Document>,
    pub video_kyc: VideoKyc,
    pub portfolio_items: Vec<PortfolioItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    pub payment_methods: Vec<PaymentMethodRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfessionalRecord {
    /// A fresh record at the first step with no evidence.
    pub fn new(professional_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            professional_id,
            current_step: OnboardingStep::default(),
            completed_steps: BTreeSet::new(),
            onboarding_completed: false,
            profile: ProfileDetails::default(),
            documents: Vec::new(),
            video_kyc: VideoKyc::default(),
            portfolio_items: Vec::new(),
            availability: None,
            payment_methods: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Count of documents with a `Verified` verdict. Pending and rejected
    /// entries never count toward the threshold.
    pub fn verified_document_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.status == VerificationStatus::Verified)
            .count()
    }

    pub fn document_count_by_status(&self, status: VerificationStatus) -> usize {
        self.documents.iter().filter(|d| d.status == status).count()
    }

    /// Whether every actionable step has been completed. The completion
    /// flag is always derived from this — it is never set independently.
    pub fn all_steps_completed(&self) -> bool {
        OnboardingStep::REQUIRED
            .iter()
            .all(|s| self.completed_steps.contains(s))
    }
}

//! OnboardingGate — the progression rule engine.
//!
//! Owns the per-professional state machine: validates step submissions,
//! applies guard rules, and advances the record. Evidence (documents, KYC
//! sessions, verdicts) flows in through separate operations and is only
//! consulted at guard-evaluation time, so verdicts landing out of order
//! never push state forward on their own.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::{Actor, Capability};
use crate::error::{GateError, Result};
use crate::store::Database;

use super::guard;
use super::payload::StepPayload;
use super::record::{
    Availability, Document, DocumentType, KycStatus, PaymentMethodRecord, PortfolioItem,
    ProfessionalRecord, VerificationStatus, VideoKyc,
};
use super::step::OnboardingStep;

/// An admin verification outcome for a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Verified,
    Rejected,
}

/// Which evidence item a verdict targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceRef {
    Document { id: Uuid },
    VideoKyc,
}

/// Result of a successful step submission.
#[derive(Debug, Clone, Serialize)]
pub struct StepAdvance {
    pub completed_step: OnboardingStep,
    pub current_step: OnboardingStep,
    pub onboarding_completed: bool,
}

/// Result of recording a verdict.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictOutcome {
    pub verdict: Verdict,
    /// Verified-document count after the update (document verdicts only).
    pub verified_documents: usize,
    /// Whether the related step's guard holds after this verdict. The
    /// step still advances only on an explicit re-submission.
    pub guard_satisfied: bool,
}

/// Status projection returned by `get_status`.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub current_step: OnboardingStep,
    pub current_step_number: u8,
    pub onboarding_completed: bool,
    pub completed_steps: Vec<OnboardingStep>,
    pub completed_step_numbers: Vec<u8>,
    pub next_step_guidance: String,
    pub blocking_issues: Vec<String>,
    pub progress_percentage: f64,
    pub total_steps: u8,
}

/// The progression gate. One instance serves all records; mutations on
/// the same record are serialized through a per-record lock, so the
/// guard-check-then-advance sequence is atomic.
pub struct OnboardingGate {
    db: Arc<dyn Database>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl OnboardingGate {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get (or create) the serialization lock for a record.
    async fn record_lock(&self, professional_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(professional_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Submit the current step. On success the step joins the completed
    /// set and `current_step` advances; a failed guard leaves the record
    /// untouched and the call may be retried freely.
    pub async fn submit_step(
        &self,
        actor: &Actor,
        professional_id: Uuid,
        payload: StepPayload,
    ) -> Result<StepAdvance> {
        actor.authorize(Capability::SubmitOwn(professional_id))?;

        let lock = self.record_lock(professional_id).await;
        let _serialized = lock.lock().await;

        // The record is created implicitly at the first profile submission.
        let record = match &payload {
            StepPayload::Profile(_) => self.db.ensure_record(professional_id).await?,
            _ => self
                .db
                .get_record(professional_id)
                .await?
                .ok_or(GateError::RecordNotFound(professional_id))?,
        };

        if record.current_step.is_terminal() {
            return Err(GateError::AlreadyCompleted);
        }

        let step = payload.step();
        if step != record.current_step {
            return Err(GateError::StepOutOfOrder {
                submitted: step,
                current: record.current_step,
            });
        }

        // Guard check precedes every write: payload evidence is persisted
        // only once its guard holds.
        match payload {
            StepPayload::Profile(submission) => {
                let details = super::record::ProfileDetails::from(submission);
                guard::profile(&details)?;
                self.db.save_profile(professional_id, &details).await?;
            }
            StepPayload::Documents => guard::documents(&record)?,
            StepPayload::VideoKyc => guard::video_kyc(&record)?,
            StepPayload::Portfolio(submission) => {
                guard::portfolio_submission(&submission)?;
                let item = PortfolioItem {
                    id: Uuid::new_v4(),
                    name: submission.name.trim().to_string(),
                    artifact_ref: submission.artifact_ref,
                    no_artifact: submission.no_artifact,
                    created_at: Utc::now(),
                };
                self.db.insert_portfolio_item(professional_id, &item).await?;
            }
            StepPayload::Availability(submission) => {
                let availability = Availability::from(submission);
                guard::availability(&availability)?;
                self.db
                    .upsert_availability(professional_id, &availability)
                    .await?;
            }
            StepPayload::Payment(submission) => {
                let method = guard::resolve_payment(&submission)?;
                let record_entry = PaymentMethodRecord {
                    id: Uuid::new_v4(),
                    method,
                    created_at: Utc::now(),
                };
                self.db
                    .insert_payment_method(professional_id, &record_entry)
                    .await?;
            }
        }

        let mut completed_steps = record.completed_steps;
        completed_steps.insert(step);
        // next() is total for non-terminal steps; the terminal case was
        // rejected above.
        let next = step.next().unwrap_or(OnboardingStep::Complete);
        let onboarding_completed = OnboardingStep::REQUIRED
            .iter()
            .all(|s| completed_steps.contains(s));

        self.db
            .save_progress(professional_id, next, &completed_steps, onboarding_completed)
            .await?;

        tracing::info!(
            professional = %professional_id,
            completed = %step,
            now_at = %next,
            "Onboarding step advanced"
        );

        Ok(StepAdvance {
            completed_step: step,
            current_step: next,
            onboarding_completed,
        })
    }

    /// Append a pending document. Never advances the state machine — the
    /// Documents step is re-checked on an explicit submission once
    /// verdicts have landed.
    pub async fn upload_document(
        &self,
        actor: &Actor,
        professional_id: Uuid,
        document_type: DocumentType,
        file_ref: String,
    ) -> Result<(Document, usize)> {
        actor.authorize(Capability::SubmitOwn(professional_id))?;

        let record = self
            .db
            .get_record(professional_id)
            .await?
            .ok_or(GateError::RecordNotFound(professional_id))?;
        if record.current_step.is_terminal() {
            return Err(GateError::AlreadyCompleted);
        }

        let document = Document {
            id: Uuid::new_v4(),
            document_type,
            file_ref,
            status: VerificationStatus::Pending,
            uploaded_at: Utc::now(),
            verified_at: None,
        };
        self.db.insert_document(professional_id, &document).await?;

        tracing::debug!(
            professional = %professional_id,
            document = %document.id,
            "Document uploaded, pending verification"
        );
        Ok((document, record.documents.len() + 1))
    }

    /// Record the single video-KYC session as submitted. Re-submission
    /// after a rejection is allowed; an already-verified session is left
    /// untouched.
    pub async fn submit_video_kyc(
        &self,
        actor: &Actor,
        professional_id: Uuid,
        session_ref: Option<String>,
    ) -> Result<VideoKyc> {
        actor.authorize(Capability::SubmitOwn(professional_id))?;

        let record = self
            .db
            .get_record(professional_id)
            .await?
            .ok_or(GateError::RecordNotFound(professional_id))?;
        if record.current_step.is_terminal() {
            return Err(GateError::AlreadyCompleted);
        }
        if record.video_kyc.status == KycStatus::Verified {
            return Ok(record.video_kyc);
        }

        let kyc = VideoKyc {
            status: KycStatus::Submitted,
            session_ref: session_ref.or(record.video_kyc.session_ref),
            submitted_at: Some(Utc::now()),
            verified_at: None,
        };
        self.db.upsert_video_kyc(professional_id, &kyc).await?;
        Ok(kyc)
    }

    /// Record an admin verdict on a piece of evidence. Updates the
    /// evidence status only — the professional re-submits the step and
    /// the guard re-checks aggregate evidence at that point.
    pub async fn record_verdict(
        &self,
        actor: &Actor,
        professional_id: Uuid,
        evidence: EvidenceRef,
        verdict: Verdict,
    ) -> Result<VerdictOutcome> {
        actor.authorize(Capability::RecordVerdict)?;

        self.db
            .get_record(professional_id)
            .await?
            .ok_or(GateError::RecordNotFound(professional_id))?;

        let now = Utc::now();
        let related_step = match evidence {
            EvidenceRef::Document { id } => {
                let status = match verdict {
                    Verdict::Verified => VerificationStatus::Verified,
                    Verdict::Rejected => VerificationStatus::Rejected,
                };
                let verified_at = (verdict == Verdict::Verified).then_some(now);
                let updated = self
                    .db
                    .set_document_status(professional_id, id, status, verified_at)
                    .await?;
                if !updated {
                    return Err(GateError::EvidenceNotFound(format!("document {id}")));
                }
                OnboardingStep::Documents
            }
            EvidenceRef::VideoKyc => {
                let status = match verdict {
                    Verdict::Verified => KycStatus::Verified,
                    Verdict::Rejected => KycStatus::Rejected,
                };
                let verified_at = (verdict == Verdict::Verified).then_some(now);
                let updated = self
                    .db
                    .set_video_kyc_status(professional_id, status, verified_at)
                    .await?;
                if !updated {
                    return Err(GateError::EvidenceNotFound(
                        "video KYC session".to_string(),
                    ));
                }
                OnboardingStep::VideoKyc
            }
        };

        let record = self
            .db
            .get_record(professional_id)
            .await?
            .ok_or(GateError::RecordNotFound(professional_id))?;

        tracing::info!(
            professional = %professional_id,
            step = %related_step,
            ?verdict,
            "Verification verdict recorded"
        );

        Ok(VerdictOutcome {
            verdict,
            verified_documents: record.verified_document_count(),
            guard_satisfied: guard::evaluate(related_step, &record).is_ok(),
        })
    }

    /// Pure read of the onboarding status. Guidance is recomputed from
    /// the latest evidence on every call, never cached.
    pub async fn get_status(&self, actor: &Actor, professional_id: Uuid) -> Result<OnboardingStatus> {
        actor.authorize(Capability::ReadStatus(professional_id))?;

        // Professionals get a record on first contact, mirroring the
        // implicit creation on first profile submission.
        let record = match actor {
            Actor::Professional { .. } => self.db.ensure_record(professional_id).await?,
            Actor::Admin => self
                .db
                .get_record(professional_id)
                .await?
                .ok_or(GateError::RecordNotFound(professional_id))?,
        };

        let completed_steps: Vec<OnboardingStep> = record.completed_steps.iter().copied().collect();
        let completed_step_numbers = completed_steps.iter().map(|s| s.number()).collect();
        let total_steps = OnboardingStep::REQUIRED.len() as u8;
        let progress_percentage =
            (completed_steps.len() as f64 / total_steps as f64) * 100.0;

        Ok(OnboardingStatus {
            current_step: record.current_step,
            current_step_number: record.current_step.number(),
            onboarding_completed: record.onboarding_completed,
            completed_steps,
            completed_step_numbers,
            next_step_guidance: next_step_guidance(&record),
            blocking_issues: blocking_issues(&record),
            progress_percentage,
            total_steps,
        })
    }
}

/// Human-readable description of the unmet guard for the current step.
fn next_step_guidance(record: &ProfessionalRecord) -> String {
    if record.current_step.is_terminal() {
        return "All steps completed! You can now receive consultation bookings.".to_string();
    }
    match guard::evaluate(record.current_step, record) {
        Ok(()) => format!(
            "All requirements met, submit the {} step to continue.",
            record.current_step
        ),
        Err(failure) => failure.to_string(),
    }
}

/// Individual unmet requirements for the current step.
fn blocking_issues(record: &ProfessionalRecord) -> Vec<String> {
    let mut issues = Vec::new();
    match record.current_step {
        OnboardingStep::Profile => {
            for field in record.profile.missing_fields() {
                issues.push(format!("Missing: {field}"));
            }
        }
        OnboardingStep::Documents => {
            let total = record.documents.len();
            let verified = record.verified_document_count();
            let pending = record.document_count_by_status(VerificationStatus::Pending);
            let rejected = record.document_count_by_status(VerificationStatus::Rejected);
            if verified >= guard::REQUIRED_VERIFIED_DOCUMENTS {
                // Guard holds; nothing blocking.
            } else if total < guard::REQUIRED_VERIFIED_DOCUMENTS {
                issues.push(format!(
                    "Need to upload {} more document(s)",
                    guard::REQUIRED_VERIFIED_DOCUMENTS - total
                ));
            } else if pending > 0 {
                issues.push(format!("{pending} document(s) pending admin verification"));
            } else if rejected > 0 {
                issues.push(format!("{rejected} document(s) rejected - please re-upload"));
            }
        }
        OnboardingStep::VideoKyc => match record.video_kyc.status {
            KycStatus::Verified => {}
            KycStatus::NotStarted => issues.push("Video KYC session not submitted".to_string()),
            KycStatus::Submitted => issues.push("Video KYC awaiting verification".to_string()),
            KycStatus::Rejected => {
                issues.push("Video KYC rejected - please submit a new session".to_string())
            }
        },
        OnboardingStep::Portfolio => {
            if record.portfolio_items.is_empty() {
                issues.push("Portfolio not created".to_string());
            }
        }
        OnboardingStep::Availability => {
            if record.availability.is_none() {
                issues.push("Consultation availability not set".to_string());
            }
        }
        OnboardingStep::Payment => {
            if record.payment_methods.is_empty() {
                issues.push("Payment method not added".to_string());
            }
        }
        OnboardingStep::Complete => {}
    }
    issues
}

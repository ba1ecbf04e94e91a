//! Submission payloads for `submit_step`.
//!
//! The payload is a tagged union — the variant names the step being
//! submitted, so a submission can never claim one step while carrying
//! another step's data.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::record::{Availability, ConsultationType, ExpertiseArea, ProfileDetails};
use super::step::OnboardingStep;

/// Per-step submission data. `Documents` and `VideoKyc` carry no data:
/// their evidence arrives through the dedicated evidence operations and
/// the submission is an explicit re-evaluation of the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepPayload {
    Profile(ProfileSubmission),
    Documents,
    VideoKyc,
    Portfolio(PortfolioSubmission),
    Availability(AvailabilitySubmission),
    Payment(PaymentSubmission),
}

impl StepPayload {
    /// The step this payload submits.
    pub fn step(&self) -> OnboardingStep {
        match self {
            Self::Profile(_) => OnboardingStep::Profile,
            Self::Documents => OnboardingStep::Documents,
            Self::VideoKyc => OnboardingStep::VideoKyc,
            Self::Portfolio(_) => OnboardingStep::Portfolio,
            Self::Availability(_) => OnboardingStep::Availability,
            Self::Payment(_) => OnboardingStep::Payment,
        }
    }
}

/// Profile fields. All optional on the wire; the guard decides which are
/// required. The picture never is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSubmission {
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

impl From<ProfileSubmission> for ProfileDetails {
    fn from(s: ProfileSubmission) -> Self {
        ProfileDetails {
            area_of_expertise: s.area_of_expertise,
            years_of_experience: s.years_of_experience,
            bio: s.bio,
            location: s.location,
            picture_ref: s.picture_ref,
        }
    }
}

/// A portfolio entry. `no_artifact` is the explicit declaration that the
/// entry ships without an attached artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSubmission {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<String>,
    #[serde(default)]
    pub no_artifact: bool,
}

fn default_duration() -> u32 {
    60
}

fn default_consultation_type() -> ConsultationType {
    ConsultationType::Both
}

/// Weekly availability window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySubmission {
    #[serde(default)]
    pub monday: bool,
    #[serde(default)]
    pub tuesday: bool,
    #[serde(default)]
    pub wednesday: bool,
    #[serde(default)]
    pub thursday: bool,
    #[serde(default)]
    pub friday: bool,
    #[serde(default)]
    pub saturday: bool,
    #[serde(default)]
    pub sunday: bool,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    #[serde(default = "default_consultation_type")]
    pub consultation_type: ConsultationType,
    #[serde(default = "default_duration")]
    pub consultation_duration_minutes: u32,
}

impl From<AvailabilitySubmission> for Availability {
    fn from(s: AvailabilitySubmission) -> Self {
        Availability {
            monday: s.monday,
            tuesday: s.tuesday,
            wednesday: s.wednesday,
            thursday: s.thursday,
            friday: s.friday,
            saturday: s.saturday,
            sunday: s.sunday,
            from_time: s.from_time,
            to_time: s.to_time,
            consultation_type: s.consultation_type,
            consultation_duration_minutes: s.consultation_duration_minutes,
        }
    }
}

/// Flat payout descriptor. The guard resolves it into exactly one typed
/// payment method or rejects it; "both kinds partially filled" is
/// representable here on purpose so it can be rejected with a reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_phone_number: Option<String>,
}

impl PaymentSubmission {
    pub fn any_bank_field(&self) -> bool {
        self.account_holder_name.is_some()
            || self.bank_name.is_some()
            || self.account_number.is_some()
            || self.ifsc_code.is_some()
    }

    pub fn any_wallet_field(&self) -> bool {
        self.wallet_provider.is_some() || self.wallet_phone_number.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_step_mapping() {
        assert_eq!(
            StepPayload::Profile(ProfileSubmission::default()).step(),
            OnboardingStep::Profile
        );
        assert_eq!(StepPayload::Documents.step(), OnboardingStep::Documents);
        assert_eq!(StepPayload::VideoKyc.step(), OnboardingStep::VideoKyc);
        assert_eq!(
            StepPayload::Payment(PaymentSubmission::default()).step(),
            OnboardingStep::Payment
        );
    }

    #[test]
    fn payload_wire_format() {
        let payload: StepPayload = serde_json::from_value(serde_json::json!({
            "step": "PROFILE",
            "data": {
                "area_of_expertise": "TAX_LAWYER",
                "years_of_experience": 7,
                "bio": "Cross-border tax work.",
                "location": "Mumbai"
            }
        }))
        .unwrap();
        match payload {
            StepPayload::Profile(p) => {
                assert_eq!(p.area_of_expertise, Some(ExpertiseArea::TaxLawyer));
                assert_eq!(p.years_of_experience, Some(7));
            }
            other => panic!("expected profile payload, got {other:?}"),
        }

        // Evidence re-check steps need no data
        let payload: StepPayload =
            serde_json::from_value(serde_json::json!({"step": "DOCUMENTS"})).unwrap();
        assert_eq!(payload.step(), OnboardingStep::Documents);
    }

    #[test]
    fn profile_submission_converts_to_details() {
        let submission = ProfileSubmission {
            bio: Some("Arbitration work.".into()),
            years_of_experience: Some(3),
            ..Default::default()
        };
        let details = ProfileDetails::from(submission);
        assert_eq!(details.bio.as_deref(), Some("Arbitration work."));
        assert_eq!(details.years_of_experience, Some(3));
        assert!(details.area_of_expertise.is_none());
        // Bio alone is not enough for the step guard
        assert!(!details.is_complete());
    }

    #[test]
    fn availability_defaults() {
        let s: AvailabilitySubmission = serde_json::from_value(serde_json::json!({
            "monday": true,
            "from_time": "09:00:00",
            "to_time": "17:00:00"
        }))
        .unwrap();
        assert_eq!(s.consultation_duration_minutes, 60);
        assert_eq!(s.consultation_type, ConsultationType::Both);
        assert!(!s.sunday);
    }

    #[test]
    fn payment_field_presence() {
        let s = PaymentSubmission {
            bank_name: Some("SBI".into()),
            wallet_provider: Some("gpay".into()),
            ..Default::default()
        };
        assert!(s.any_bank_field());
        assert!(s.any_wallet_field());
        assert!(!PaymentSubmission::default().any_bank_field());
    }
}

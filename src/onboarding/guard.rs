//! Step guards — pure predicates over the record snapshot.
//!
//! A guard must hold before its step may be marked complete. Guards read
//! the latest committed evidence at evaluation time; verdicts landing
//! asynchronously never push state forward on their own.

use super::payload::{PaymentSubmission, PortfolioSubmission};
use super::record::{
    Availability, KycStatus, PaymentMethod, ProfessionalRecord, ProfileDetails,
};
use super::step::OnboardingStep;

/// Number of verified documents required to pass the Documents step.
pub const REQUIRED_VERIFIED_DOCUMENTS: usize = 2;

/// Minimum portfolio item name length after trimming.
pub const MIN_PORTFOLIO_NAME_LEN: usize = 3;

/// The specific unmet requirement behind a `GuardNotSatisfied` failure.
/// The Display rendering is the human-readable reason surfaced in
/// mutation messages and in status guidance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardFailure {
    #[error("profile incomplete, missing: {}", .0.join(", "))]
    ProfileIncomplete(Vec<&'static str>),

    #[error("need {REQUIRED_VERIFIED_DOCUMENTS} verified documents, have {have}")]
    NeedVerifiedDocuments { have: usize },

    #[error("video KYC session not submitted")]
    KycNotSubmitted,

    #[error("video KYC submitted, awaiting verification")]
    KycAwaitingVerdict,

    #[error("video KYC rejected, please submit a new session")]
    KycRejected,

    #[error("portfolio not created")]
    PortfolioNotCreated,

    #[error("portfolio name must be at least {MIN_PORTFOLIO_NAME_LEN} characters")]
    PortfolioNameTooShort,

    #[error("portfolio item needs an artifact reference or an explicit no-artifact declaration")]
    PortfolioArtifactUndeclared,

    #[error("consultation availability not set")]
    AvailabilityNotSet,

    #[error("select at least one available day")]
    NoDaysSelected,

    #[error("end time must be after start time")]
    InvalidTimeWindow,

    #[error("consultation duration must be greater than zero")]
    InvalidDuration,

    #[error("payment method not added")]
    PaymentMethodNotAdded,

    #[error("exactly one payment method type required")]
    ExactlyOnePaymentMethod,

    #[error("incomplete bank account details, missing: {}", .0.join(", "))]
    IncompleteBankAccount(Vec<&'static str>),

    #[error("account number must be at least 8 digits")]
    InvalidAccountNumber,

    #[error("IFSC code must be exactly 11 characters")]
    InvalidIfscCode,

    #[error("wallet provider and phone number are required for digital wallet")]
    IncompleteWallet,

    #[error("wallet phone number must be 10 digits")]
    InvalidWalletPhone,
}

/// Evaluate the guard for `step` against stored evidence.
///
/// Used both by `submit_step` for the evidence-driven steps and by the
/// status projection, so guidance always reflects the same rules that
/// gate advancement.
pub fn evaluate(step: OnboardingStep, record: &ProfessionalRecord) -> Result<(), GuardFailure> {
    match step {
        OnboardingStep::Profile => profile(&record.profile),
        OnboardingStep::Documents => documents(record),
        OnboardingStep::VideoKyc => video_kyc(record),
        OnboardingStep::Portfolio => {
            if record.portfolio_items.is_empty() {
                Err(GuardFailure::PortfolioNotCreated)
            } else {
                Ok(())
            }
        }
        OnboardingStep::Availability => match &record.availability {
            Some(a) => availability(a),
            None => Err(GuardFailure::AvailabilityNotSet),
        },
        OnboardingStep::Payment => {
            if record.payment_methods.is_empty() {
                Err(GuardFailure::PaymentMethodNotAdded)
            } else {
                Ok(())
            }
        }
        // Terminal state has no guard; submit_step rejects it earlier.
        OnboardingStep::Complete => Ok(()),
    }
}

/// Profile: expertise, experience, bio, and location present. Picture is
/// optional.
pub fn profile(profile: &ProfileDetails) -> Result<(), GuardFailure> {
    let missing = profile.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GuardFailure::ProfileIncomplete(missing))
    }
}

/// Documents: at least two verified. Pending and rejected never count.
pub fn documents(record: &ProfessionalRecord) -> Result<(), GuardFailure> {
    let have = record.verified_document_count();
    if have >= REQUIRED_VERIFIED_DOCUMENTS {
        Ok(())
    } else {
        Err(GuardFailure::NeedVerifiedDocuments { have })
    }
}

/// Video KYC: the single session record must carry a Verified verdict.
pub fn video_kyc(record: &ProfessionalRecord) -> Result<(), GuardFailure> {
    match record.video_kyc.status {
        KycStatus::Verified => Ok(()),
        KycStatus::NotStarted => Err(GuardFailure::KycNotSubmitted),
        KycStatus::Submitted => Err(GuardFailure::KycAwaitingVerdict),
        KycStatus::Rejected => Err(GuardFailure::KycRejected),
    }
}

/// Validate a portfolio entry before it is persisted.
pub fn portfolio_submission(submission: &PortfolioSubmission) -> Result<(), GuardFailure> {
    if submission.name.trim().len() < MIN_PORTFOLIO_NAME_LEN {
        return Err(GuardFailure::PortfolioNameTooShort);
    }
    let has_artifact = submission
        .artifact_ref
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());
    if !has_artifact && !submission.no_artifact {
        return Err(GuardFailure::PortfolioArtifactUndeclared);
    }
    Ok(())
}

/// Availability: at least one day, a forward time window, and a positive
/// duration.
pub fn availability(availability: &Availability) -> Result<(), GuardFailure> {
    if !availability.any_day_selected() {
        return Err(GuardFailure::NoDaysSelected);
    }
    if availability.from_time >= availability.to_time {
        return Err(GuardFailure::InvalidTimeWindow);
    }
    if availability.consultation_duration_minutes == 0 {
        return Err(GuardFailure::InvalidDuration);
    }
    Ok(())
}

/// Resolve a flat payment descriptor into exactly one typed method.
///
/// Bank account and digital wallet are mutually exclusive; touching fields
/// of both kinds, or neither, is rejected before completeness is checked.
pub fn resolve_payment(submission: &PaymentSubmission) -> Result<PaymentMethod, GuardFailure> {
    match (submission.any_bank_field(), submission.any_wallet_field()) {
        (true, true) | (false, false) => Err(GuardFailure::ExactlyOnePaymentMethod),
        (true, false) => resolve_bank_account(submission),
        (false, true) => resolve_wallet(submission),
    }
}

fn resolve_bank_account(submission: &PaymentSubmission) -> Result<PaymentMethod, GuardFailure> {
    let mut missing = Vec::new();
    if blank(&submission.account_holder_name) {
        missing.push("Account Holder Name");
    }
    if blank(&submission.bank_name) {
        missing.push("Bank Name");
    }
    if blank(&submission.account_number) {
        missing.push("Account Number");
    }
    if blank(&submission.ifsc_code) {
        missing.push("Ifsc Code");
    }
    if !missing.is_empty() {
        return Err(GuardFailure::IncompleteBankAccount(missing));
    }

    let account_number = submission.account_number.as_deref().unwrap_or_default().trim();
    if account_number.len() < 8 || !account_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(GuardFailure::InvalidAccountNumber);
    }
    let ifsc_code = submission.ifsc_code.as_deref().unwrap_or_default().trim();
    if ifsc_code.len() != 11 {
        return Err(GuardFailure::InvalidIfscCode);
    }

    Ok(PaymentMethod::BankAccount {
        account_holder_name: submission
            .account_holder_name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        bank_name: submission.bank_name.as_deref().unwrap_or_default().trim().to_string(),
        account_number: account_number.to_string(),
        ifsc_code: ifsc_code.to_string(),
    })
}

fn resolve_wallet(submission: &PaymentSubmission) -> Result<PaymentMethod, GuardFailure> {
    if blank(&submission.wallet_provider) || blank(&submission.wallet_phone_number) {
        return Err(GuardFailure::IncompleteWallet);
    }

    let raw = submission.wallet_phone_number.as_deref().unwrap_or_default().trim();
    // Accept formatted numbers like +919567894970; store the bare digits.
    let phone = raw.strip_prefix("+91").or_else(|| raw.strip_prefix('+')).unwrap_or(raw);
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(GuardFailure::InvalidWalletPhone);
    }

    Ok(PaymentMethod::DigitalWallet {
        wallet_provider: submission
            .wallet_provider
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        wallet_phone_number: phone.to_string(),
    })
}

fn blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(|s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::record::{Document, DocumentType, VerificationStatus};
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    fn record() -> ProfessionalRecord {
        ProfessionalRecord::new(Uuid::new_v4(), Utc::now())
    }

    fn push_document(record: &mut ProfessionalRecord, status: VerificationStatus) {
        record.documents.push(Document {
            id: Uuid::new_v4(),
            document_type: DocumentType::GovernmentId,
            file_ref: "upload-1".into(),
            status,
            uploaded_at: Utc::now(),
            verified_at: None,
        });
    }

    #[test]
    fn documents_guard_counts_only_verified() {
        let mut r = record();
        push_document(&mut r, VerificationStatus::Verified);
        push_document(&mut r, VerificationStatus::Pending);
        push_document(&mut r, VerificationStatus::Rejected);

        let err = documents(&r).unwrap_err();
        assert_eq!(err, GuardFailure::NeedVerifiedDocuments { have: 1 });
        assert_eq!(err.to_string(), "need 2 verified documents, have 1");

        push_document(&mut r, VerificationStatus::Verified);
        assert!(documents(&r).is_ok());
    }

    #[test]
    fn kyc_guard_distinguishes_states() {
        let mut r = record();
        assert_eq!(video_kyc(&r), Err(GuardFailure::KycNotSubmitted));
        r.video_kyc.status = KycStatus::Submitted;
        assert_eq!(video_kyc(&r), Err(GuardFailure::KycAwaitingVerdict));
        r.video_kyc.status = KycStatus::Rejected;
        assert_eq!(video_kyc(&r), Err(GuardFailure::KycRejected));
        r.video_kyc.status = KycStatus::Verified;
        assert!(video_kyc(&r).is_ok());
    }

    #[test]
    fn portfolio_submission_rules() {
        let ok = PortfolioSubmission {
            name: "Land dispute brief".into(),
            artifact_ref: Some("upload-7".into()),
            no_artifact: false,
        };
        assert!(portfolio_submission(&ok).is_ok());

        let short = PortfolioSubmission {
            name: " ab ".into(),
            artifact_ref: Some("upload-7".into()),
            no_artifact: false,
        };
        assert_eq!(
            portfolio_submission(&short),
            Err(GuardFailure::PortfolioNameTooShort)
        );

        let undeclared = PortfolioSubmission {
            name: "Case study".into(),
            artifact_ref: None,
            no_artifact: false,
        };
        assert_eq!(
            portfolio_submission(&undeclared),
            Err(GuardFailure::PortfolioArtifactUndeclared)
        );

        let declared = PortfolioSubmission {
            name: "Case study".into(),
            artifact_ref: None,
            no_artifact: true,
        };
        assert!(portfolio_submission(&declared).is_ok());
    }

    #[test]
    fn availability_rules() {
        let base = Availability {
            monday: true,
            tuesday: false,
            wednesday: false,
            thursday: false,
            friday: false,
            saturday: false,
            sunday: false,
            from_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            to_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            consultation_type: crate::onboarding::record::ConsultationType::Video,
            consultation_duration_minutes: 30,
        };
        assert!(availability(&base).is_ok());

        let no_days = Availability { monday: false, ..base.clone() };
        assert_eq!(availability(&no_days), Err(GuardFailure::NoDaysSelected));

        let backwards = Availability {
            from_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            ..base.clone()
        };
        assert_eq!(availability(&backwards), Err(GuardFailure::InvalidTimeWindow));

        let zero_duration = Availability {
            consultation_duration_minutes: 0,
            ..base
        };
        assert_eq!(availability(&zero_duration), Err(GuardFailure::InvalidDuration));
    }

    #[test]
    fn payment_requires_exactly_one_kind() {
        // Both kinds partially filled
        let mixed = PaymentSubmission {
            bank_name: Some("SBI".into()),
            wallet_provider: Some("gpay".into()),
            ..Default::default()
        };
        let err = resolve_payment(&mixed).unwrap_err();
        assert_eq!(err, GuardFailure::ExactlyOnePaymentMethod);
        assert_eq!(err.to_string(), "exactly one payment method type required");

        // Neither kind
        assert_eq!(
            resolve_payment(&PaymentSubmission::default()),
            Err(GuardFailure::ExactlyOnePaymentMethod)
        );
    }

    #[test]
    fn bank_account_validation() {
        let incomplete = PaymentSubmission {
            account_holder_name: Some("R. Iyer".into()),
            bank_name: Some("SBI".into()),
            ..Default::default()
        };
        match resolve_payment(&incomplete) {
            Err(GuardFailure::IncompleteBankAccount(missing)) => {
                assert_eq!(missing, vec!["Account Number", "Ifsc Code"]);
            }
            other => panic!("expected incomplete bank account, got {other:?}"),
        }

        let short_account = PaymentSubmission {
            account_holder_name: Some("R. Iyer".into()),
            bank_name: Some("SBI".into()),
            account_number: Some("1234".into()),
            ifsc_code: Some("SBIN0001234".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_payment(&short_account),
            Err(GuardFailure::InvalidAccountNumber)
        );

        let bad_ifsc = PaymentSubmission {
            account_number: Some("12345678".into()),
            ifsc_code: Some("SBIN01".into()),
            ..short_account.clone()
        };
        assert_eq!(resolve_payment(&bad_ifsc), Err(GuardFailure::InvalidIfscCode));

        let ok = PaymentSubmission {
            account_number: Some("123456789012".into()),
            ifsc_code: Some("SBIN0001234".into()),
            ..short_account
        };
        match resolve_payment(&ok).unwrap() {
            PaymentMethod::BankAccount { account_number, .. } => {
                assert_eq!(account_number, "123456789012");
            }
            other => panic!("expected bank account, got {other:?}"),
        }
    }

    #[test]
    fn wallet_validation_normalizes_phone() {
        let formatted = PaymentSubmission {
            wallet_provider: Some("gpay".into()),
            wallet_phone_number: Some("+919567894970".into()),
            ..Default::default()
        };
        match resolve_payment(&formatted).unwrap() {
            PaymentMethod::DigitalWallet { wallet_phone_number, .. } => {
                assert_eq!(wallet_phone_number, "9567894970");
            }
            other => panic!("expected wallet, got {other:?}"),
        }

        let bad = PaymentSubmission {
            wallet_provider: Some("gpay".into()),
            wallet_phone_number: Some("12345".into()),
            ..Default::default()
        };
        assert_eq!(resolve_payment(&bad), Err(GuardFailure::InvalidWalletPhone));
    }

    #[test]
    fn evaluate_matches_stored_evidence() {
        let mut r = record();
        assert!(matches!(
            evaluate(OnboardingStep::Profile, &r),
            Err(GuardFailure::ProfileIncomplete(_))
        ));
        assert_eq!(
            evaluate(OnboardingStep::Portfolio, &r),
            Err(GuardFailure::PortfolioNotCreated)
        );
        assert_eq!(
            evaluate(OnboardingStep::Availability, &r),
            Err(GuardFailure::AvailabilityNotSet)
        );
        assert_eq!(
            evaluate(OnboardingStep::Payment, &r),
            Err(GuardFailure::PaymentMethodNotAdded)
        );

        r.profile.area_of_expertise =
            Some(crate::onboarding::record::ExpertiseArea::FamilyLawyer);
        r.profile.years_of_experience = Some(4);
        r.profile.bio = Some("Family law, mediation-first.".into());
        r.profile.location = Some("Kochi".into());
        assert!(evaluate(OnboardingStep::Profile, &r).is_ok());
    }
}

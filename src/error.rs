//! Error types for the onboarding gate.

use uuid::Uuid;

use crate::onboarding::guard::GuardFailure;
use crate::onboarding::step::OnboardingStep;

/// Failures a gate operation can signal. None of these are fatal to the
/// process; the HTTP boundary recovers every one into a
/// `{success: false, message}` response, and a failed call never leaves
/// the record partially mutated.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("cannot submit {submitted} step while on {current}, complete steps in order")]
    StepOutOfOrder {
        submitted: OnboardingStep,
        current: OnboardingStep,
    },

    #[error("{0}")]
    GuardNotSatisfied(#[from] GuardFailure),

    #[error("onboarding already completed")]
    AlreadyCompleted,

    #[error("not authorized: {0}")]
    NotAuthorized(&'static str),

    #[error("no onboarding record for professional {0}")]
    RecordNotFound(Uuid),

    #[error("{0} not found")]
    EvidenceNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Persistence-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

//! Onboarding domain — the professional progression gate.
//!
//! A professional works through a fixed sequence of steps (profile,
//! documents, video KYC, portfolio, availability, payment). The gate owns
//! the per-professional state machine: it validates each submission
//! against the current step, evaluates the step's guard over the latest
//! evidence, and advances the record. Admin verdicts update evidence only;
//! advancement is always an explicit, idempotent re-check.

pub mod gate;
pub mod guard;
pub mod payload;
pub mod record;
pub mod routes;
pub mod step;

pub use gate::{EvidenceRef, OnboardingGate, OnboardingStatus, StepAdvance, Verdict, VerdictOutcome};
pub use guard::GuardFailure;
pub use payload::StepPayload;
pub use record::{ProfessionalRecord, VerificationStatus};
pub use routes::{GateRouteState, onboarding_routes};
pub use step::OnboardingStep;

//! Actors and capabilities.
//!
//! Identity is established upstream — the gate receives an already
//! verified actor and only decides what that actor may do. Authorization
//! is one predicate, not role checks scattered through the operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GateError;

/// The caller of a gate operation, as established by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    /// A professional working through their own onboarding.
    Professional { id: Uuid },
    /// An administrative verifier.
    Admin,
}

/// What an operation needs permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Submit a step or evidence for the given professional's record.
    SubmitOwn(Uuid),
    /// Record a verification verdict.
    RecordVerdict,
    /// Read the given professional's onboarding status.
    ReadStatus(Uuid),
}

impl Actor {
    /// Check this actor against a capability. `Err` carries the reason
    /// used verbatim in the response message.
    pub fn authorize(&self, capability: Capability) -> Result<(), GateError> {
        let allowed = match (self, capability) {
            (Actor::Professional { id }, Capability::SubmitOwn(target)) => *id == target,
            (Actor::Professional { id }, Capability::ReadStatus(target)) => *id == target,
            (Actor::Professional { .. }, Capability::RecordVerdict) => false,
            (Actor::Admin, Capability::ReadStatus(_)) => true,
            (Actor::Admin, Capability::RecordVerdict) => true,
            (Actor::Admin, Capability::SubmitOwn(_)) => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(GateError::NotAuthorized(match capability {
                Capability::SubmitOwn(_) => {
                    "only the professional may submit their own onboarding steps"
                }
                Capability::RecordVerdict => "only admin can record verification verdicts",
                Capability::ReadStatus(_) => {
                    "professionals may only read their own onboarding status"
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn professional_may_only_act_on_own_record() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let actor = Actor::Professional { id };

        assert!(actor.authorize(Capability::SubmitOwn(id)).is_ok());
        assert!(actor.authorize(Capability::ReadStatus(id)).is_ok());
        assert!(actor.authorize(Capability::SubmitOwn(other)).is_err());
        assert!(actor.authorize(Capability::ReadStatus(other)).is_err());
        assert!(actor.authorize(Capability::RecordVerdict).is_err());
    }

    #[test]
    fn admin_verifies_and_reads_but_never_submits() {
        let target = Uuid::new_v4();
        assert!(Actor::Admin.authorize(Capability::RecordVerdict).is_ok());
        assert!(Actor::Admin.authorize(Capability::ReadStatus(target)).is_ok());
        assert!(Actor::Admin.authorize(Capability::SubmitOwn(target)).is_err());
    }
}

//! Onboarding step state machine — tracks which stage a professional is in.

use serde::{Deserialize, Serialize};

/// The stages of professional onboarding.
///
/// Progresses linearly: Profile → Documents → VideoKyc → Portfolio →
/// Availability → Payment → Complete. The step is a tagged state, never a
/// bare counter; the numeric projection exists only for client display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStep {
    Profile,
    Documents,
    VideoKyc,
    Portfolio,
    Availability,
    Payment,
    Complete,
}

impl OnboardingStep {
    /// The six actionable steps, in order. `Complete` is terminal and is
    /// never a member of its own precondition.
    pub const REQUIRED: [OnboardingStep; 6] = [
        Self::Profile,
        Self::Documents,
        Self::VideoKyc,
        Self::Portfolio,
        Self::Availability,
        Self::Payment,
    ];

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (Profile, Documents)
                | (Documents, VideoKyc)
                | (VideoKyc, Portfolio)
                | (Portfolio, Availability)
                | (Availability, Payment)
                | (Payment, Complete)
        )
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Profile => Some(Documents),
            Documents => Some(VideoKyc),
            VideoKyc => Some(Portfolio),
            Portfolio => Some(Availability),
            Availability => Some(Payment),
            Payment => Some(Complete),
            Complete => None,
        }
    }

    /// 1-based ordinal kept for client compatibility. Derived, never stored.
    pub fn number(&self) -> u8 {
        use OnboardingStep::*;
        match self {
            Profile => 1,
            Documents => 2,
            VideoKyc => 3,
            Portfolio => 4,
            Availability => 5,
            Payment => 6,
            Complete => 7,
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Profile
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "PROFILE",
            Self::Documents => "DOCUMENTS",
            Self::VideoKyc => "VIDEO_KYC",
            Self::Portfolio => "PORTFOLIO",
            Self::Availability => "AVAILABILITY",
            Self::Payment => "PAYMENT",
            Self::Complete => "COMPLETE",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OnboardingStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROFILE" => Ok(Self::Profile),
            "DOCUMENTS" => Ok(Self::Documents),
            "VIDEO_KYC" => Ok(Self::VideoKyc),
            "PORTFOLIO" => Ok(Self::Portfolio),
            "AVAILABILITY" => Ok(Self::Availability),
            "PAYMENT" => Ok(Self::Payment),
            "COMPLETE" => Ok(Self::Complete),
            other => Err(format!("unknown onboarding step: {other}")),
        }
    }
}

#![forbid(unsafe_code)]

//! Submission lifecycle states.

use std::fmt;

/// Where a form is in its submission lifecycle.
///
/// ```text
/// Idle ──submit──▶ Validating ──errors──▶ Idle
///                      │
///                      └──valid──▶ Submitting ──ok──▶ Succeeded ──▶ Idle
///                                      │
///                                      └──err──▶ Failed ──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionState {
    /// No pending operation; field edits allowed.
    #[default]
    Idle,
    /// Validation is running for a submit request.
    Validating,
    /// The submit handler is running.
    Submitting,
    /// The handler completed successfully.
    Succeeded,
    /// The handler reported an error.
    Failed,
}

impl SubmissionState {
    /// Returns `true` while a submit request is being processed
    /// (validating or submitting). Submit controls should be disabled.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }

    /// Returns `true` for the transient settled states.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Idle | Self::Submitting)
                | (Self::Submitting, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Idle)
        )
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

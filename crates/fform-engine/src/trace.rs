#![forbid(unsafe_code)]

//! Submission tokens and the lifecycle event trace.
//!
//! Every accepted submit gets a fresh [`SubmissionToken`]. The engine records
//! each transition and every submit it accepts, rejects or drops in a
//! [`SubmissionTrace`], which tests can checksum or check with
//! [`SubmissionTrace::verify_invariants`].

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::state::SubmissionState;

// ---------------------------------------------------------------------------
// SubmissionToken
// ---------------------------------------------------------------------------

/// Identifies one accepted submission.
///
/// # Invariants
///
/// - Tokens issued by one engine are strictly increasing.
/// - Token 0 is reserved for "no submission".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SubmissionToken(u64);

impl SubmissionToken {
    /// The null token.
    pub const NONE: Self = Self(0);

    /// Create a token from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if this is the null token.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Submission({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// SubmissionEvent
// ---------------------------------------------------------------------------

/// Why a submit request was dropped without running validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// A submission was already validating or submitting.
    Busy,
    /// The form was unmounted.
    Unmounted,
}

impl IgnoreReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::Unmounted => "unmounted",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event in the submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubmissionEvent {
    /// The state changed.
    Transition {
        from: SubmissionState,
        to: SubmissionState,
    },
    /// Validation failed; the handler was not called.
    Rejected {
        field_count: usize,
        error_count: usize,
    },
    /// The handler was started for `token`.
    Started { token: SubmissionToken },
    /// The handler for `token` finished.
    Settled {
        token: SubmissionToken,
        succeeded: bool,
    },
    /// A submit request was dropped.
    Dropped { reason: IgnoreReason },
    /// A settle arrived for a token that is no longer in flight, or after unmount.
    StaleSettle { token: SubmissionToken },
}

impl SubmissionEvent {
    /// Short event-type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Transition { .. } => "transition",
            Self::Rejected { .. } => "rejected",
            Self::Started { .. } => "started",
            Self::Settled { .. } => "settled",
            Self::Dropped { .. } => "dropped",
            Self::StaleSettle { .. } => "stale_settle",
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionTrace
// ---------------------------------------------------------------------------

/// Ordered record of [`SubmissionEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionTrace {
    events: Vec<SubmissionEvent>,
}

impl SubmissionTrace {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: SubmissionEvent) {
        self.events.push(event);
    }

    /// All events in order.
    #[must_use]
    pub fn events(&self) -> &[SubmissionEvent] {
        &self.events
    }

    /// The sequence of states visited, starting from `Idle`.
    #[must_use]
    pub fn states(&self) -> Vec<SubmissionState> {
        let mut states = vec![SubmissionState::Idle];
        states.extend(self.events.iter().filter_map(|e| match e {
            SubmissionEvent::Transition { to, .. } => Some(*to),
            _ => None,
        }));
        states
    }

    /// Number of events of the given type.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    /// Checksum over every event and its position.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            event.hash(&mut hasher);
        }
        hasher.finish()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Check the recorded lifecycle.
    ///
    /// Returns one message per violation; empty means the trace is consistent.
    #[must_use]
    pub fn verify_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut state = SubmissionState::Idle;
        let mut last_started = SubmissionToken::NONE;
        let mut in_flight: Option<SubmissionToken> = None;

        for (i, event) in self.events.iter().enumerate() {
            match *event {
                SubmissionEvent::Transition { from, to } => {
                    if from != state {
                        violations.push(format!(
                            "event {i}: transition starts at {from} but state is {state}"
                        ));
                    }
                    if !from.can_transition_to(to) {
                        violations.push(format!("event {i}: illegal transition {from} -> {to}"));
                    }
                    state = to;
                }
                SubmissionEvent::Started { token } => {
                    if token <= last_started {
                        violations.push(format!(
                            "event {i}: non-monotonic start token {token} after {last_started}"
                        ));
                    }
                    if let Some(open) = in_flight {
                        violations.push(format!(
                            "event {i}: {token} started while {open} in flight"
                        ));
                    }
                    last_started = token;
                    in_flight = Some(token);
                }
                SubmissionEvent::Settled { token, .. } => {
                    if in_flight != Some(token) {
                        violations.push(format!("event {i}: settled {token} was not in flight"));
                    }
                    in_flight = None;
                }
                SubmissionEvent::StaleSettle { token } => {
                    if token > last_started {
                        violations.push(format!(
                            "event {i}: stale settle for unissued token {token}"
                        ));
                    }
                }
                SubmissionEvent::Rejected { .. } | SubmissionEvent::Dropped { .. } => {}
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SubmissionState::*;

    fn tr(from: SubmissionState, to: SubmissionState) -> SubmissionEvent {
        SubmissionEvent::Transition { from, to }
    }

    fn happy_path() -> SubmissionTrace {
        let token = SubmissionToken::from_raw(1);
        let mut trace = SubmissionTrace::new();
        trace.push(tr(Idle, Validating));
        trace.push(tr(Validating, Submitting));
        trace.push(SubmissionEvent::Started { token });
        trace.push(SubmissionEvent::Settled {
            token,
            succeeded: true,
        });
        trace.push(tr(Submitting, Succeeded));
        trace.push(tr(Succeeded, Idle));
        trace
    }

    #[test]
    fn token_none_is_zero() {
        assert!(SubmissionToken::NONE.is_none());
        assert_eq!(SubmissionToken::default(), SubmissionToken::NONE);
        assert_eq!(SubmissionToken::NONE.next().raw(), 1);
        assert_eq!(SubmissionToken::from_raw(3).to_string(), "Submission(3)");
    }

    #[test]
    fn happy_path_is_consistent() {
        let trace = happy_path();
        assert!(trace.verify_invariants().is_empty());
        assert_eq!(trace.states(), [Idle, Validating, Submitting, Succeeded, Idle]);
        assert_eq!(trace.count("transition"), 4);
    }

    #[test]
    fn detects_illegal_transition() {
        let mut trace = SubmissionTrace::new();
        trace.push(tr(Idle, Submitting));
        let violations = trace.verify_invariants();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("illegal transition"));
    }

    #[test]
    fn detects_broken_chain() {
        let mut trace = SubmissionTrace::new();
        trace.push(tr(Validating, Idle));
        assert!(trace.verify_invariants()[0].contains("state is idle"));
    }

    #[test]
    fn detects_overlapping_submissions() {
        let mut trace = SubmissionTrace::new();
        trace.push(SubmissionEvent::Started {
            token: SubmissionToken::from_raw(1),
        });
        trace.push(SubmissionEvent::Started {
            token: SubmissionToken::from_raw(2),
        });
        assert!(trace.verify_invariants()[0].contains("in flight"));
    }

    #[test]
    fn detects_non_monotonic_tokens() {
        let token = SubmissionToken::from_raw(2);
        let mut trace = SubmissionTrace::new();
        trace.push(SubmissionEvent::Started { token });
        trace.push(SubmissionEvent::Settled {
            token,
            succeeded: false,
        });
        trace.push(SubmissionEvent::Started { token });
        assert!(trace.verify_invariants()[0].contains("non-monotonic"));
    }

    #[test]
    fn checksum_is_order_sensitive() {
        let a = happy_path();
        let mut b = SubmissionTrace::new();
        for event in a.events().iter().rev() {
            b.push(event.clone());
        }
        assert_eq!(a.checksum(), happy_path().checksum());
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn clear_empties() {
        let mut trace = happy_path();
        assert_eq!(trace.len(), 6);
        trace.clear();
        assert!(trace.is_empty());
    }
}

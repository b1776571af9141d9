#![forbid(unsafe_code)]

//! The synchronous form state machine.
//!
//! [`FormEngine`] owns the field values and the [`SubmissionState`]. A submit
//! is split in two steps so the engine never has to hold a future:
//!
//! 1. [`FormEngine::begin_submit`] validates and, if the values are valid,
//!    issues a [`PendingSubmission`] carrying a token and a clone of the values.
//! 2. [`FormEngine::settle`] applies the handler's result for that token.
//!
//! [`Form`](crate::Form) drives both steps around an async handler.

use fform_validate::{FieldValue, FieldValues, ValidationError, ValidationErrors};

use crate::config::ValidateFn;
use crate::error::SubmissionError;
use crate::state::SubmissionState;
use crate::trace::{IgnoreReason, SubmissionEvent, SubmissionToken, SubmissionTrace};

/// Everything a renderer needs to draw the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    pub values: FieldValues,
    pub state: SubmissionState,
    /// `true` while validating or submitting.
    pub submitting: bool,
    pub field_errors: ValidationErrors,
    /// The most recent handler failure, cleared when a new submission starts.
    pub last_error: Option<SubmissionError>,
    /// Number of submit requests that reached validation.
    pub submit_count: u64,
    /// `true` if any value differs from the initial values.
    pub dirty: bool,
}

impl FormSnapshot {
    /// Errors for one field; empty if the field is valid.
    #[must_use]
    pub fn errors_for(&self, field: &str) -> &[ValidationError] {
        self.field_errors.get(field).unwrap_or(&[])
    }

    /// First error message for a field, the way a field caption shows it.
    #[must_use]
    pub fn first_message(&self, field: &str) -> Option<String> {
        self.errors_for(field).first().map(ValidationError::format_message)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Receives a [`FormSnapshot`] after every state change.
pub trait FormRenderer {
    fn render(&mut self, snapshot: &FormSnapshot);
}

impl<F: FnMut(&FormSnapshot)> FormRenderer for F {
    fn render(&mut self, snapshot: &FormSnapshot) {
        self(snapshot);
    }
}

/// An accepted submission waiting for its handler.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub token: SubmissionToken,
    /// Values to hand to the submit handler.
    pub values: FieldValues,
}

/// Result of [`FormEngine::begin_submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    /// Values are valid; run the handler and then call [`FormEngine::settle`].
    Started(PendingSubmission),
    /// Validation failed; the form is back to `Idle`.
    Rejected(ValidationErrors),
    /// The request was dropped without validating.
    Ignored(IgnoreReason),
}

/// How a submit action ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The handler succeeded.
    Succeeded,
    /// The handler failed; the error is also stored as `last_error`.
    Failed(SubmissionError),
    /// Validation failed; the handler was not called.
    Invalid(ValidationErrors),
    /// Dropped because the form was busy or unmounted.
    Ignored(IgnoreReason),
    /// The handler finished after the form was unmounted or dropped.
    Abandoned,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Form state machine.
pub struct FormEngine {
    initial: FieldValues,
    values: FieldValues,
    validate: ValidateFn,
    state: SubmissionState,
    field_errors: ValidationErrors,
    last_error: Option<SubmissionError>,
    submit_count: u64,
    last_token: SubmissionToken,
    in_flight: Option<SubmissionToken>,
    mounted: bool,
    renderers: Vec<Box<dyn FormRenderer>>,
    /// Queue snapshots in `pending` instead of rendering in place.
    deferred: bool,
    /// Renderers are checked out by the caller delivering `pending`.
    renderers_out: bool,
    pending: Vec<FormSnapshot>,
    trace: Option<SubmissionTrace>,
}

impl FormEngine {
    /// Create a mounted, idle engine.
    #[must_use]
    pub fn new(initial: FieldValues, validate: ValidateFn) -> Self {
        Self {
            values: initial.clone(),
            initial,
            validate,
            state: SubmissionState::Idle,
            field_errors: ValidationErrors::new(),
            last_error: None,
            submit_count: 0,
            last_token: SubmissionToken::NONE,
            in_flight: None,
            mounted: true,
            renderers: Vec::new(),
            deferred: false,
            renderers_out: false,
            pending: Vec::new(),
            trace: None,
        }
    }

    /// Record lifecycle events in a [`SubmissionTrace`].
    ///
    /// Off by default; the trace grows with every submit and dropped request.
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(SubmissionTrace::new());
        self
    }

    // --- Accessors ---

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state.is_busy()
    }

    #[must_use]
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    #[must_use]
    pub fn initial_values(&self) -> &FieldValues {
        &self.initial
    }

    #[must_use]
    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn submit_count(&self) -> u64 {
        self.submit_count
    }

    /// Token of the submission currently awaiting its handler.
    #[must_use]
    pub fn in_flight(&self) -> Option<SubmissionToken> {
        self.in_flight
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The lifecycle trace, if enabled with [`FormEngine::with_trace`].
    #[must_use]
    pub fn trace(&self) -> Option<&SubmissionTrace> {
        self.trace.as_ref()
    }

    /// Whether `field` differs from its initial value.
    #[must_use]
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.values.get(field) != self.initial.get(field)
    }

    /// Fields whose value differs from the initial values, in value order.
    #[must_use]
    pub fn dirty_fields(&self) -> Vec<&str> {
        self.values
            .names()
            .filter(|name| self.is_field_dirty(name))
            .collect()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            state: self.state,
            submitting: self.state.is_busy(),
            field_errors: self.field_errors.clone(),
            last_error: self.last_error.clone(),
            submit_count: self.submit_count,
            dirty: self.is_dirty(),
        }
    }

    // --- Mutation ---

    /// Register a renderer. It is rendered once immediately.
    pub fn subscribe(&mut self, mut renderer: impl FormRenderer + 'static) {
        renderer.render(&self.snapshot());
        self.add_renderer(Box::new(renderer));
    }

    /// Register a renderer that has already seen the current snapshot.
    /// Dropped after unmount.
    pub(crate) fn add_renderer(&mut self, renderer: Box<dyn FormRenderer>) {
        if self.mounted {
            self.renderers.push(renderer);
        }
    }

    /// Set a field value.
    ///
    /// Ignored (returns `false`) while validating or submitting, and after
    /// unmount.
    pub fn set_value(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        let field = field.into();
        if !self.mounted || self.state.is_busy() {
            tracing::debug!(field = %field, state = self.state.as_str(), "field edit ignored");
            return false;
        }
        self.values.set(field, value);
        self.publish();
        true
    }

    /// Run the validate callback without submitting and expose the result.
    ///
    /// Only while idle; returns the errors now shown.
    pub fn revalidate(&mut self) -> &ValidationErrors {
        if self.mounted && self.state == SubmissionState::Idle {
            self.field_errors = (self.validate)(&self.values);
            self.publish();
        }
        &self.field_errors
    }

    /// Restore the initial values and clear errors. Only while idle.
    pub fn reset(&mut self) -> bool {
        if !self.mounted || self.state != SubmissionState::Idle {
            return false;
        }
        self.values = self.initial.clone();
        self.field_errors = ValidationErrors::new();
        self.last_error = None;
        self.publish();
        true
    }

    /// Start a submit: validate, then either reject or issue a pending submission.
    pub fn begin_submit(&mut self) -> SubmitRequest {
        if let Some(reason) = self.ignore_reason() {
            tracing::debug!(reason = reason.as_str(), "submit request dropped");
            self.record(SubmissionEvent::Dropped { reason });
            return SubmitRequest::Ignored(reason);
        }

        self.submit_count += 1;
        self.transition(SubmissionState::Validating);

        let errors = (self.validate)(&self.values);
        if !errors.is_empty() {
            tracing::debug!(
                fields = errors.len(),
                errors = errors.error_count(),
                "submit rejected by validation"
            );
            self.record(SubmissionEvent::Rejected {
                field_count: errors.len(),
                error_count: errors.error_count(),
            });
            self.field_errors = errors.clone();
            self.transition(SubmissionState::Idle);
            return SubmitRequest::Rejected(errors);
        }

        let token = self.last_token.next();
        self.last_token = token;
        self.in_flight = Some(token);
        self.field_errors = ValidationErrors::new();
        self.last_error = None;
        self.transition(SubmissionState::Submitting);
        self.record(SubmissionEvent::Started { token });

        SubmitRequest::Started(PendingSubmission {
            token,
            values: self.values.clone(),
        })
    }

    /// Apply the handler result for `token`.
    ///
    /// A settle after unmount, or for a token that is not in flight, changes
    /// nothing and returns [`SubmitOutcome::Abandoned`].
    pub fn settle(
        &mut self,
        token: SubmissionToken,
        result: Result<(), SubmissionError>,
    ) -> SubmitOutcome {
        if !self.mounted || self.in_flight != Some(token) {
            tracing::trace!(%token, mounted = self.mounted, "settle ignored");
            self.record(SubmissionEvent::StaleSettle { token });
            return SubmitOutcome::Abandoned;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.record(SubmissionEvent::Settled {
                    token,
                    succeeded: true,
                });
                self.transition(SubmissionState::Succeeded);
                self.transition(SubmissionState::Idle);
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                if err.is_cancelled() {
                    tracing::debug!(%token, "submission cancelled");
                } else {
                    tracing::warn!(%token, error = %err, "submission failed");
                }
                self.record(SubmissionEvent::Settled {
                    token,
                    succeeded: false,
                });
                self.last_error = Some(err.clone());
                self.transition(SubmissionState::Failed);
                self.transition(SubmissionState::Idle);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Detach the form. Renderers are dropped and every later call is a no-op.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        tracing::debug!(state = self.state.as_str(), "form unmounted");
        self.mounted = false;
        self.renderers.clear();
        self.pending.clear();
    }

    // --- Deferred rendering ---
    //
    // `Form` renders outside its `RefCell` borrow so renderers may call back
    // into it. In deferred mode snapshots queue up until the caller takes
    // them together with the renderers, renders, and hands the renderers back.

    pub(crate) fn defer_rendering(&mut self) {
        self.deferred = true;
    }

    pub(crate) fn take_pending(&mut self) -> Vec<FormSnapshot> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn take_renderers(&mut self) -> Vec<Box<dyn FormRenderer>> {
        self.renderers_out = true;
        std::mem::take(&mut self.renderers)
    }

    /// Return checked-out renderers ahead of any subscribed meanwhile.
    pub(crate) fn restore_renderers(&mut self, mut renderers: Vec<Box<dyn FormRenderer>>) {
        self.renderers_out = false;
        if !self.mounted {
            return;
        }
        renderers.append(&mut self.renderers);
        self.renderers = renderers;
    }

    fn ignore_reason(&self) -> Option<IgnoreReason> {
        if !self.mounted {
            Some(IgnoreReason::Unmounted)
        } else if self.state != SubmissionState::Idle {
            Some(IgnoreReason::Busy)
        } else {
            None
        }
    }

    fn transition(&mut self, to: SubmissionState) {
        let from = self.state;
        debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
        tracing::debug!(from = from.as_str(), to = to.as_str(), "submission state transition");
        self.state = to;
        self.record(SubmissionEvent::Transition { from, to });
        self.publish();
    }

    fn record(&mut self, event: SubmissionEvent) {
        if let Some(trace) = &mut self.trace {
            trace.push(event);
        }
    }

    fn publish(&mut self) {
        if self.renderers.is_empty() && !self.renderers_out {
            return;
        }
        let snapshot = self.snapshot();
        if self.deferred {
            self.pending.push(snapshot);
            return;
        }
        for renderer in &mut self.renderers {
            renderer.render(&snapshot);
        }
    }
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("values", &self.values)
            .field("state", &self.state)
            .field("field_errors", &self.field_errors)
            .field("last_error", &self.last_error)
            .field("submit_count", &self.submit_count)
            .field("in_flight", &self.in_flight)
            .field("mounted", &self.mounted)
            .field("renderers", &self.renderers.len())
            .field("traced", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

#![forbid(unsafe_code)]

//! Form configuration: initial values, the validate callback, the submit handler.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use fform_validate::{ConstraintSet, FieldValues, ValidateOptions, ValidationErrors, validate};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::SubmissionError;

/// Validation callback run on every submit request.
pub type ValidateFn = Box<dyn Fn(&FieldValues) -> ValidationErrors>;

/// Future returned by a [`SubmitHandler`].
pub type SubmitFuture = LocalBoxFuture<'static, Result<(), SubmissionError>>;

/// Caller-supplied async submit action.
///
/// Called exactly once per accepted submit, with a clone of the current
/// values. Any `Fn(FieldValues) -> impl Future<Output = Result<(), SubmissionError>>`
/// is a handler.
pub trait SubmitHandler {
    fn submit(&self, values: FieldValues) -> SubmitFuture;
}

impl<F, Fut> SubmitHandler for F
where
    F: Fn(FieldValues) -> Fut,
    Fut: Future<Output = Result<(), SubmissionError>> + 'static,
{
    fn submit(&self, values: FieldValues) -> SubmitFuture {
        self(values).boxed_local()
    }
}

/// Configuration for a [`Form`](crate::Form).
///
/// # Example
///
/// ```rust
/// use fform_engine::{FormConfig, SubmissionError};
/// use fform_validate::{ConstraintSet, FieldValues, ValidateOptions};
///
/// let config = FormConfig::new(FieldValues::new().with("phone", ""))
///     .constraints(ConstraintSet::new().required("phone"), ValidateOptions::new())
///     .on_submit(|_values| async { Ok::<(), SubmissionError>(()) });
/// # let _ = config;
/// ```
pub struct FormConfig {
    pub(crate) initial_values: FieldValues,
    pub(crate) validate: ValidateFn,
    pub(crate) on_submit: Rc<dyn SubmitHandler>,
    pub(crate) trace: bool,
}

impl FormConfig {
    /// Config with the given initial values, no validation and a handler
    /// that always succeeds.
    #[must_use]
    pub fn new(initial_values: FieldValues) -> Self {
        Self {
            initial_values,
            validate: Box::new(|_: &FieldValues| ValidationErrors::new()),
            on_submit: Rc::new(|_values: FieldValues| async { Ok::<(), SubmissionError>(()) }),
            trace: false,
        }
    }

    /// Set the validate callback.
    #[must_use]
    pub fn validate(mut self, validate: impl Fn(&FieldValues) -> ValidationErrors + 'static) -> Self {
        self.validate = Box::new(validate);
        self
    }

    /// Validate with a constraint set.
    #[must_use]
    pub fn constraints(self, rules: ConstraintSet, options: ValidateOptions) -> Self {
        self.validate(move |values| validate(&rules, values, &options))
    }

    /// Set the submit handler.
    #[must_use]
    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Rc::new(handler);
        self
    }

    /// Record a [`SubmissionTrace`](crate::SubmissionTrace) for the form.
    ///
    /// Off by default. Intended for tests and debugging; the trace is never
    /// truncated.
    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// The initial values.
    #[must_use]
    pub fn initial_values(&self) -> &FieldValues {
        &self.initial_values
    }
}

impl fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormConfig")
            .field("initial_values", &self.initial_values)
            .field("trace", &self.trace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn defaults_accept_everything() {
        let config = FormConfig::new(FieldValues::new().with("a", ""));
        assert!((config.validate)(config.initial_values()).is_empty());
        assert!(!config.trace);
        assert_eq!(block_on(config.on_submit.submit(FieldValues::new())), Ok(()));
    }

    #[test]
    fn constraints_build_validate_callback() {
        let config = FormConfig::new(FieldValues::new())
            .constraints(ConstraintSet::new().required("phone"), ValidateOptions::new());
        let errors = (config.validate)(&FieldValues::new().with("phone", ""));
        assert_eq!(errors.messages("phone"), ["phone is required"]);
    }

    #[test]
    fn closure_handler_receives_values() {
        let handler = |values: FieldValues| async move {
            match values.text("phone") {
                Some("ok") => Ok(()),
                _ => Err(SubmissionError::new("rejected")),
            }
        };
        let ok = block_on(handler.submit(FieldValues::new().with("phone", "ok")));
        let err = block_on(handler.submit(FieldValues::new()));
        assert_eq!(ok, Ok(()));
        assert_eq!(err, Err(SubmissionError::new("rejected")));
    }
}

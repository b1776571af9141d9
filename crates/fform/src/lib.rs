#![forbid(unsafe_code)]

//! fform public facade crate.
//!
//! Re-exports the validator, the segmenter and the form engine, and offers a
//! prelude for day-to-day usage.
//!
//! # Example
//!
//! ```rust
//! use fform::prelude::*;
//! use futures::executor::block_on;
//!
//! # fn main() -> fform::Result<()> {
//! let rules = ConstraintSet::from_json(r#"{"phone": {"presence": {"allowEmpty": false}}}"#)?;
//! let form = Form::new(
//!     FormConfig::new(FieldValues::new().with("phone", ""))
//!         .constraints(rules, ValidateOptions::new().alias("phone", "Phone")),
//! );
//!
//! let SubmitOutcome::Invalid(errors) = block_on(form.handle_submit()) else {
//!     unreachable!()
//! };
//! assert_eq!(errors.messages("phone"), ["Phone is required"]);
//!
//! form.set_value("phone", "5551234");
//! block_on(form.handle_submit()).into_result()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

// --- Validation re-exports -------------------------------------------------

pub use fform_validate::{
    Constraint, ConstraintSet, ERROR_CODE_REQUIRED, ERROR_CODE_TOO_LONG, ERROR_CODE_TOO_SHORT,
    FieldValue, FieldValues, LabelResolver, MessageTemplates, Rule, RuleParseError, ValidateOptions,
    ValidationError, ValidationErrors, validate,
};

// --- Text re-exports -------------------------------------------------------

pub use fform_text::{
    CaseInsensitive, Delimited, Fragment, Literal, Matcher, TextSegment, replace_with, segment,
};

// --- Engine re-exports -----------------------------------------------------

pub use fform_engine::{
    Form, FormConfig, FormEngine, FormRenderer, FormSnapshot, IgnoreReason, SubmissionError,
    SubmissionState, SubmissionTrace, SubmitHandler, SubmitOutcome,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for fform apps.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A JSON rule set could not be parsed.
    Rules(RuleParseError),
    /// Submitted values failed validation.
    Invalid(ValidationErrors),
    /// The submit handler failed.
    Submission(SubmissionError),
    /// The submit was dropped or its result arrived after unmount.
    NotSubmitted(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(err) => write!(f, "{err}"),
            Self::Invalid(errors) => write!(f, "invalid values: {errors}"),
            Self::Submission(err) => write!(f, "{err}"),
            Self::NotSubmitted(reason) => write!(f, "not submitted: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rules(err) => Some(err),
            Self::Submission(err) => Some(err),
            Self::Invalid(_) | Self::NotSubmitted(_) => None,
        }
    }
}

impl From<RuleParseError> for Error {
    fn from(err: RuleParseError) -> Self {
        Self::Rules(err)
    }
}

impl From<SubmissionError> for Error {
    fn from(err: SubmissionError) -> Self {
        Self::Submission(err)
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Standard result type for fform APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert a [`SubmitOutcome`] into a [`Result`].
pub trait OutcomeExt {
    /// `Ok(())` only for a successful submission.
    fn into_result(self) -> Result<()>;
}

impl OutcomeExt for SubmitOutcome {
    fn into_result(self) -> Result<()> {
        match self {
            Self::Succeeded => Ok(()),
            Self::Failed(err) => Err(Error::Submission(err)),
            Self::Invalid(errors) => Err(Error::Invalid(errors)),
            Self::Ignored(reason) => Err(Error::NotSubmitted(reason.to_string())),
            Self::Abandoned => Err(Error::NotSubmitted("abandoned".to_string())),
        }
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ConstraintSet, Delimited, Error, FieldValue, FieldValues, Form, FormConfig, FormSnapshot,
        Matcher, OutcomeExt, Result, SubmissionError, SubmissionState, SubmitOutcome, TextSegment,
        ValidateOptions, segment,
    };

    pub use crate::{engine, text, validation};
}

pub use fform_engine as engine;
pub use fform_text as text;
pub use fform_validate as validation;

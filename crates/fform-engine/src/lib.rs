#![forbid(unsafe_code)]

//! Form state and submission lifecycle.
//!
//! - [`FormEngine`]: synchronous state machine over [`FieldValues`](fform_validate::FieldValues)
//!   with a validation gate before every submit
//! - [`Form`]: `Rc`-shared async handle that runs the submit handler
//! - [`FormSnapshot`] / [`FormRenderer`]: the render contract
//! - [`SubmissionTrace`]: opt-in lifecycle event log for tests and debugging
//!
//! # Lifecycle
//!
//! `Idle → Validating → (Idle | Submitting → (Succeeded | Failed) → Idle)`.
//! Edits and submit requests are dropped while validating or submitting.

mod config;
mod engine;
mod error;
mod form;
mod state;
mod trace;

pub use config::{FormConfig, SubmitFuture, SubmitHandler, ValidateFn};
pub use engine::{
    FormEngine, FormRenderer, FormSnapshot, PendingSubmission, SubmitOutcome, SubmitRequest,
};
pub use error::{SubmissionError, SubmissionErrorKind};
pub use form::Form;
pub use state::SubmissionState;
pub use trace::{IgnoreReason, SubmissionEvent, SubmissionToken, SubmissionTrace};

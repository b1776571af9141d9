#![forbid(unsafe_code)]

//! Declarative constraint validation.
//!
//! This crate provides:
//! - [`FieldValues`], an ordered map of field names to scalar values
//! - [`ConstraintSet`], per-field rule lists built in code or parsed from JSON
//! - [`validate`], which evaluates a rule set into a [`ValidationErrors`] map
//! - error codes and `{param}` interpolation for i18n
//!
//! # Example
//!
//! ```rust
//! use fform_validate::{ConstraintSet, FieldValues, ValidateOptions, validate};
//!
//! let rules = ConstraintSet::new().required("phone");
//! let options = ValidateOptions::new().alias("phone", "Phone");
//!
//! let errors = validate(&rules, &FieldValues::new().with("phone", " "), &options);
//! assert_eq!(errors.messages("phone"), ["Phone is required"]);
//!
//! let errors = validate(&rules, &FieldValues::new().with("phone", "x"), &options);
//! assert!(errors.is_empty());
//! ```

mod errors;
mod rules;
mod validate;
mod validators;
mod values;

pub use errors::{
    ERROR_CODE_REQUIRED, ERROR_CODE_TOO_LONG, ERROR_CODE_TOO_SHORT, ValidationError,
    ValidationErrors,
};
pub use rules::{Constraint, ConstraintSet, RuleParseError};
pub use validate::{LabelResolver, ValidateOptions, validate};
pub use validators::{Length, MessageTemplates, Presence, Rule};
pub use values::{FieldValue, FieldValues};

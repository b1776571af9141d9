#![forbid(unsafe_code)]

//! Validation error types.

use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Error Codes (for i18n lookup)
// ---------------------------------------------------------------------------

/// Error code for a missing or blank required value.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for minimum length validation.
pub const ERROR_CODE_TOO_SHORT: &str = "too_short";
/// Error code for maximum length validation.
pub const ERROR_CODE_TOO_LONG: &str = "too_long";

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A validation error with code, message template, and interpolation parameters.
///
/// The `code` field is a stable identifier for i18n systems.
/// The `message` field is a template using `{key}` placeholders.
///
/// # Example
///
/// ```rust
/// use fform_validate::ValidationError;
///
/// let error = ValidationError::new("too_short", "{label} needs {count} characters")
///     .with_param("label", "Password")
///     .with_param("count", 6);
///
/// assert_eq!(error.format_message(), "Password needs 6 characters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable error code for programmatic handling and i18n.
    pub code: &'static str,
    /// Human-readable error message template.
    pub message: String,
    /// Parameters for message interpolation.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Create a new validation error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Add a parameter for message interpolation.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Look up an interpolation parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Format the message with parameter substitution.
    ///
    /// Replaces `{key}` patterns in the message with corresponding parameter
    /// values in one left-to-right pass. Substituted text is never scanned
    /// again, and unknown placeholders are kept as written.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut result = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();
        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let param = after
                .find('}')
                .and_then(|close| self.params.get(&after[..close]).map(|value| (close, value)));
            match param {
                Some((close, value)) => {
                    result.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    result.push('{');
                    rest = after;
                }
            }
        }
        result.push_str(rest);
        result
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// ValidationErrors
// ---------------------------------------------------------------------------

/// Per-field validation errors, in the order fields were validated.
///
/// Fields without violations are absent, so an empty map means valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<ValidationError>)>,
}

impl ValidationErrors {
    /// Create an empty (valid) error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no field has errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Total number of errors across all fields.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.fields.iter().map(|(_, errs)| errs.len()).sum()
    }

    /// Append an error for a field.
    pub fn push(&mut self, field: impl Into<String>, error: ValidationError) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, errs)) => errs.push(error),
            None => self.fields.push((field, vec![error])),
        }
    }

    /// Append several errors for a field. An empty list leaves the map unchanged.
    pub fn extend(&mut self, field: impl Into<String>, errors: Vec<ValidationError>) {
        if errors.is_empty() {
            return;
        }
        let field = field.into();
        for error in errors {
            self.push(field.clone(), error);
        }
    }

    /// Errors for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[ValidationError]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, errs)| errs.as_slice())
    }

    /// Returns `true` if the field has at least one error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Formatted messages for a field (empty when the field is valid).
    #[must_use]
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.get(field)
            .map(|errs| errs.iter().map(ValidationError::format_message).collect())
            .unwrap_or_default()
    }

    /// Names of fields with errors.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(field, errors)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.fields
            .iter()
            .map(|(name, errs)| (name.as_str(), errs.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, errs) in &self.fields {
            for err in errs {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{err}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_format_multiple_params() {
        let err = ValidationError::new("test", "Between {min} and {max}")
            .with_param("min", 1)
            .with_param("max", 10);
        assert_eq!(err.format_message(), "Between 1 and 10");
        assert_eq!(err.param("min"), Some("1"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let err = ValidationError::new("too_short", "{label} needs {count}")
            .with_param("label", "PIN {count}")
            .with_param("count", 6);
        for _ in 0..50 {
            assert_eq!(err.format_message(), "PIN {count} needs 6");
        }
    }

    #[test]
    fn unknown_and_unclosed_placeholders_are_kept() {
        let err = ValidationError::new("x", "{{label}} {missing} {label").with_param("label", "Phone");
        assert_eq!(err.format_message(), "{Phone} {missing} {label");
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new("test", "Error: {code}").with_param("code", "E001");
        assert_eq!(format!("{err}"), "Error: E001");
    }

    #[test]
    fn errors_group_by_field_in_push_order() {
        let mut errors = ValidationErrors::new();
        errors.push("password", ValidationError::new("a", "first"));
        errors.push("phone", ValidationError::new("b", "second"));
        errors.push("password", ValidationError::new("c", "third"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.error_count(), 3);
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["password", "phone"]);
        assert_eq!(errors.messages("password"), ["first", "third"]);
        assert!(errors.messages("missing").is_empty());
    }

    #[test]
    fn extend_with_nothing_keeps_field_absent() {
        let mut errors = ValidationErrors::new();
        errors.extend("phone", Vec::new());
        assert!(errors.is_empty());
        assert!(!errors.contains("phone"));
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.push("a", ValidationError::new("x", "one"));
        errors.push("b", ValidationError::new("y", "two"));
        assert_eq!(errors.to_string(), "one; two");
    }
}

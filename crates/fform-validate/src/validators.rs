#![forbid(unsafe_code)]

//! Built-in rule kinds.

use crate::errors::{ERROR_CODE_REQUIRED, ERROR_CODE_TOO_LONG, ERROR_CODE_TOO_SHORT, ValidationError};
use crate::values::FieldValue;

// ---------------------------------------------------------------------------
// MessageTemplates
// ---------------------------------------------------------------------------

/// Message templates for the built-in rules.
///
/// Templates may use `{label}` (the resolved field label) and `{count}`
/// (the length bound). Replace them to localize messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    /// Used when a required value is missing or blank.
    pub required: String,
    /// Used when a value is shorter than the minimum.
    pub too_short: String,
    /// Used when a value is longer than the maximum.
    pub too_long: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            required: "{label} is required".to_string(),
            too_short: "{label} is too short (minimum is {count} characters)".to_string(),
            too_long: "{label} is too long (maximum is {count} characters)".to_string(),
        }
    }
}

impl MessageTemplates {
    /// Override the required-value template.
    #[must_use]
    pub fn required(mut self, template: impl Into<String>) -> Self {
        self.required = template.into();
        self
    }

    /// Override the too-short template.
    #[must_use]
    pub fn too_short(mut self, template: impl Into<String>) -> Self {
        self.too_short = template.into();
        self
    }

    /// Override the too-long template.
    #[must_use]
    pub fn too_long(mut self, template: impl Into<String>) -> Self {
        self.too_long = template.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Rule Trait
// ---------------------------------------------------------------------------

/// A single rule kind applied to one field's value.
///
/// `value` is `None` when the field is absent from the value map. Rules never
/// see the label; the caller attaches it as the `label` parameter.
pub trait Rule: Send + Sync {
    /// Rule kind name as it appears in declarative rule sets.
    fn kind(&self) -> &'static str;

    /// Check the value, returning every violation found.
    fn check(&self, value: Option<&FieldValue>, messages: &MessageTemplates) -> Vec<ValidationError>;
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Requires the field to hold a value.
///
/// With `allow_empty = false`, empty and whitespace-only text also fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence {
    /// If `true`, empty text counts as present.
    pub allow_empty: bool,
}

impl Presence {
    /// Create a presence rule.
    #[must_use]
    pub fn new(allow_empty: bool) -> Self {
        Self { allow_empty }
    }
}

impl Rule for Presence {
    fn kind(&self) -> &'static str {
        "presence"
    }

    fn check(&self, value: Option<&FieldValue>, messages: &MessageTemplates) -> Vec<ValidationError> {
        let missing = match value {
            None | Some(FieldValue::Null) => true,
            Some(v) => !self.allow_empty && v.is_blank(),
        };
        if missing {
            vec![ValidationError::new(ERROR_CODE_REQUIRED, &messages.required)]
        } else {
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// Bounds the character count of a text value.
///
/// Absent, null and non-text values are skipped. The two bounds are checked
/// independently, so a rule with `minimum > maximum` can report both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Length {
    /// Minimum number of characters (inclusive).
    pub minimum: Option<usize>,
    /// Maximum number of characters (inclusive).
    pub maximum: Option<usize>,
}

impl Length {
    /// Create a length rule with both bounds.
    #[must_use]
    pub fn between(minimum: usize, maximum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    /// Create a length rule with only a lower bound.
    #[must_use]
    pub fn at_least(minimum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: None,
        }
    }

    /// Create a length rule with only an upper bound.
    #[must_use]
    pub fn at_most(maximum: usize) -> Self {
        Self {
            minimum: None,
            maximum: Some(maximum),
        }
    }
}

impl Rule for Length {
    fn kind(&self) -> &'static str {
        "length"
    }

    fn check(&self, value: Option<&FieldValue>, messages: &MessageTemplates) -> Vec<ValidationError> {
        let Some(FieldValue::Text(text)) = value else {
            return Vec::new();
        };
        let len = text.chars().count();
        let mut errors = Vec::new();
        if let Some(min) = self.minimum
            && len < min
        {
            errors.push(
                ValidationError::new(ERROR_CODE_TOO_SHORT, &messages.too_short)
                    .with_param("count", min)
                    .with_param("actual", len),
            );
        }
        if let Some(max) = self.maximum
            && len > max
        {
            errors.push(
                ValidationError::new(ERROR_CODE_TOO_LONG, &messages.too_long)
                    .with_param("count", max)
                    .with_param("actual", len),
            );
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    fn codes(errors: &[ValidationError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.code).collect()
    }

    // -- Presence --

    #[test]
    fn presence_rejects_missing_and_null() {
        let rule = Presence::new(false);
        let m = MessageTemplates::default();
        assert_eq!(codes(&rule.check(None, &m)), [ERROR_CODE_REQUIRED]);
        assert_eq!(codes(&rule.check(Some(&FieldValue::Null), &m)), [ERROR_CODE_REQUIRED]);
    }

    #[test]
    fn presence_rejects_blank_text() {
        let rule = Presence::new(false);
        let m = MessageTemplates::default();
        assert_eq!(rule.check(Some(&text("")), &m).len(), 1);
        assert_eq!(rule.check(Some(&text("   ")), &m).len(), 1);
        assert_eq!(rule.check(Some(&text("\t\n")), &m).len(), 1);
        assert!(rule.check(Some(&text("x")), &m).is_empty());
    }

    #[test]
    fn presence_allow_empty_accepts_blank_text() {
        let rule = Presence::new(true);
        let m = MessageTemplates::default();
        assert!(rule.check(Some(&text("")), &m).is_empty());
        assert_eq!(rule.check(None, &m).len(), 1);
    }

    #[test]
    fn presence_accepts_non_text_scalars() {
        let rule = Presence::new(false);
        let m = MessageTemplates::default();
        assert!(rule.check(Some(&FieldValue::Bool(false)), &m).is_empty());
        assert!(rule.check(Some(&FieldValue::Number(0)), &m).is_empty());
    }

    // -- Length --

    #[test]
    fn length_boundaries() {
        let rule = Length::between(6, 100);
        let m = MessageTemplates::default();
        assert_eq!(codes(&rule.check(Some(&text("12345")), &m)), [ERROR_CODE_TOO_SHORT]);
        assert!(rule.check(Some(&text("123456")), &m).is_empty());
        assert!(rule.check(Some(&text(&"x".repeat(100))), &m).is_empty());
        assert_eq!(
            codes(&rule.check(Some(&text(&"x".repeat(101))), &m)),
            [ERROR_CODE_TOO_LONG]
        );
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let rule = Length::at_most(3);
        let m = MessageTemplates::default();
        assert!(rule.check(Some(&text("日本語")), &m).is_empty());
        assert_eq!(rule.check(Some(&text("日本語!")), &m).len(), 1);
    }

    #[test]
    fn length_skips_absent_and_non_text() {
        let rule = Length::at_least(6);
        let m = MessageTemplates::default();
        assert!(rule.check(None, &m).is_empty());
        assert!(rule.check(Some(&FieldValue::Null), &m).is_empty());
        assert!(rule.check(Some(&FieldValue::Bool(true)), &m).is_empty());
    }

    #[test]
    fn length_checks_empty_text() {
        let rule = Length::at_least(1);
        let m = MessageTemplates::default();
        assert_eq!(rule.check(Some(&text("")), &m).len(), 1);
    }

    #[test]
    fn inverted_bounds_report_both() {
        let rule = Length::between(5, 2);
        let m = MessageTemplates::default();
        assert_eq!(
            codes(&rule.check(Some(&text("abc")), &m)),
            [ERROR_CODE_TOO_SHORT, ERROR_CODE_TOO_LONG]
        );
    }

    #[test]
    fn length_error_params() {
        let rule = Length::at_least(6);
        let m = MessageTemplates::default();
        let errors = rule.check(Some(&text("abc")), &m);
        assert_eq!(errors[0].param("count"), Some("6"));
        assert_eq!(errors[0].param("actual"), Some("3"));
    }

    #[test]
    fn custom_templates() {
        let m = MessageTemplates::default().required("{label} fehlt");
        let errors = Presence::new(false).check(None, &m);
        assert_eq!(
            errors[0].clone().with_param("label", "Telefon").format_message(),
            "Telefon fehlt"
        );
    }
}

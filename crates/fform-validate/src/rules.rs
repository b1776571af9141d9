#![forbid(unsafe_code)]

//! Declarative rule sets.
//!
//! A [`ConstraintSet`] maps field names to an ordered list of [`Constraint`]s.
//! Sets are built in code or parsed from JSON in the validate.js shape:
//!
//! ```rust
//! use fform_validate::ConstraintSet;
//!
//! let rules = ConstraintSet::from_json(r#"{
//!     "phone": { "presence": { "allowEmpty": false } },
//!     "password": {
//!         "presence": { "allowEmpty": false },
//!         "length": { "minimum": 6, "maximum": 100 }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(rules.fields().collect::<Vec<_>>(), ["phone", "password"]);
//! ```
//!
//! Parsing is lenient: malformed rule parameters are dropped with a warning
//! and unknown rule kinds are kept as [`Constraint::Unknown`], which
//! validation ignores.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::ValidationError;
use crate::validators::{Length, MessageTemplates, Presence, Rule};
use crate::values::FieldValue;

/// One rule applied to a field.
#[derive(Clone)]
pub enum Constraint {
    Presence(Presence),
    Length(Length),
    /// An application-defined [`Rule`].
    Custom(Arc<dyn Rule>),
    /// A rule kind this crate does not know. Ignored during validation.
    Unknown(String),
}

impl Constraint {
    /// A presence rule.
    #[must_use]
    pub fn presence(allow_empty: bool) -> Self {
        Self::Presence(Presence::new(allow_empty))
    }

    /// A length rule with optional bounds.
    #[must_use]
    pub fn length(minimum: Option<usize>, maximum: Option<usize>) -> Self {
        Self::Length(Length { minimum, maximum })
    }

    /// Wrap an application-defined rule.
    #[must_use]
    pub fn custom(rule: impl Rule + 'static) -> Self {
        Self::Custom(Arc::new(rule))
    }

    /// Rule kind name.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Presence(r) => r.kind(),
            Self::Length(r) => r.kind(),
            Self::Custom(r) => r.kind(),
            Self::Unknown(name) => name,
        }
    }

    /// Evaluate against a value. Unknown rules never fail.
    #[must_use]
    pub fn check(&self, value: Option<&FieldValue>, messages: &MessageTemplates) -> Vec<ValidationError> {
        match self {
            Self::Presence(r) => r.check(value, messages),
            Self::Length(r) => r.check(value, messages),
            Self::Custom(r) => r.check(value, messages),
            Self::Unknown(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence(r) => f.debug_tuple("Presence").field(r).finish(),
            Self::Length(r) => f.debug_tuple("Length").field(r).finish(),
            Self::Custom(r) => f.debug_tuple("Custom").field(&r.kind()).finish(),
            Self::Unknown(name) => f.debug_tuple("Unknown").field(name).finish(),
        }
    }
}

/// Custom rules compare by identity.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Presence(a), Self::Presence(b)) => a == b,
            (Self::Length(a), Self::Length(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (Self::Unknown(a), Self::Unknown(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Constraint {}

/// Ordered mapping from field name to its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintSet {
    fields: Vec<(String, Vec<Constraint>)>,
}

impl ConstraintSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint to a field, creating the field entry if needed.
    #[must_use]
    pub fn rule(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.push(field, constraint);
        self
    }

    /// Shorthand for `rule(field, Constraint::presence(false))`.
    #[must_use]
    pub fn required(self, field: impl Into<String>) -> Self {
        self.rule(field, Constraint::presence(false))
    }

    /// Shorthand for a length rule with both bounds.
    #[must_use]
    pub fn length(self, field: impl Into<String>, minimum: usize, maximum: usize) -> Self {
        self.rule(field, Constraint::length(Some(minimum), Some(maximum)))
    }

    /// Append a constraint in place.
    pub fn push(&mut self, field: impl Into<String>, constraint: Constraint) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, rules)) => rules.push(constraint),
            None => self.fields.push((field, vec![constraint])),
        }
    }

    /// Constraints for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[Constraint]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(field, constraints)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Constraint])> {
        self.fields
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Returns `true` if no field has rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a rule set from a validate.js-style JSON document.
    pub fn from_json(source: &str) -> Result<Self, RuleParseError> {
        let value: Value = serde_json::from_str(source).map_err(|err| RuleParseError::Syntax {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        })?;
        Self::from_json_value(&value)
    }

    /// Build a rule set from an already parsed JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self, RuleParseError> {
        let Value::Object(root) = value else {
            return Err(RuleParseError::NotAnObject);
        };
        let mut set = Self::new();
        for (field, rules) in root {
            let Value::Object(rules) = rules else {
                tracing::warn!(field = %field, "ignoring field rules: expected an object");
                continue;
            };
            // Keep the field even when every rule is dropped, so `fields()`
            // still reflects the document.
            set.fields.push((field.clone(), Vec::new()));
            for (kind, params) in rules {
                if let Some(constraint) = parse_constraint(field, kind, params) {
                    set.push(field.clone(), constraint);
                }
            }
        }
        Ok(set)
    }
}

fn parse_constraint(field: &str, kind: &str, params: &Value) -> Option<Constraint> {
    match kind {
        "presence" => match params {
            Value::Bool(false) | Value::Null => None,
            Value::Bool(true) => Some(Constraint::presence(false)),
            Value::Object(map) => {
                let allow_empty = match map.get("allowEmpty") {
                    None => false,
                    Some(Value::Bool(b)) => *b,
                    Some(other) => {
                        tracing::warn!(
                            field = %field,
                            value = %other,
                            "ignoring presence.allowEmpty: expected a boolean"
                        );
                        false
                    }
                };
                Some(Constraint::presence(allow_empty))
            }
            other => {
                tracing::warn!(field = %field, value = %other, "ignoring presence rule parameters");
                Some(Constraint::presence(false))
            }
        },
        "length" => {
            let Value::Object(map) = params else {
                tracing::warn!(field = %field, value = %params, "ignoring length rule: expected an object");
                return None;
            };
            let bound = |name: &str| -> Option<usize> {
                let raw = map.get(name)?;
                match raw.as_u64().and_then(|n| usize::try_from(n).ok()) {
                    Some(n) => Some(n),
                    None => {
                        tracing::warn!(
                            field = %field,
                            param = name,
                            value = %raw,
                            "ignoring length bound: expected a non-negative integer"
                        );
                        None
                    }
                }
            };
            Some(Constraint::length(bound("minimum"), bound("maximum")))
        }
        other => Some(Constraint::Unknown(other.to_string())),
    }
}

/// Errors from parsing a JSON rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    /// The document is not valid JSON.
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// The document root is not an object.
    NotAnObject,
}

impl fmt::Display for RuleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax {
                message,
                line,
                column,
            } => write!(f, "invalid rule set at {line}:{column}: {message}"),
            Self::NotAnObject => f.write_str("rule set must be a JSON object"),
        }
    }
}

impl std::error::Error for RuleParseError {}

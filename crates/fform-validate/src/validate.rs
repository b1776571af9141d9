#![forbid(unsafe_code)]

//! Rule-set evaluation.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::ValidationErrors;
use crate::rules::ConstraintSet;
use crate::validators::MessageTemplates;
use crate::values::FieldValues;

/// Label lookup used when a field has no alias.
pub type LabelResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Options for [`validate`].
///
/// Labels resolve through the alias map first, then the resolver, then fall
/// back to the raw field name.
#[derive(Clone, Default)]
pub struct ValidateOptions {
    alias: HashMap<String, String>,
    resolver: Option<LabelResolver>,
    messages: MessageTemplates,
}

impl ValidateOptions {
    /// Options with no aliases and default messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display label for a field.
    #[must_use]
    pub fn alias(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.alias.insert(field.into(), label.into());
        self
    }

    /// Set a label resolver consulted for fields without an alias.
    #[must_use]
    pub fn label_resolver(
        mut self,
        resolver: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Replace the message templates.
    #[must_use]
    pub fn messages(mut self, messages: MessageTemplates) -> Self {
        self.messages = messages;
        self
    }

    /// The message templates in use.
    #[must_use]
    pub fn message_templates(&self) -> &MessageTemplates {
        &self.messages
    }

    /// Resolve the display label for a field.
    #[must_use]
    pub fn label_for<'a>(&'a self, field: &'a str) -> Cow<'a, str> {
        if let Some(label) = self.alias.get(field) {
            return Cow::Borrowed(label);
        }
        if let Some(resolver) = &self.resolver
            && let Some(label) = resolver(field)
        {
            return Cow::Owned(label);
        }
        Cow::Borrowed(field)
    }
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("alias", &self.alias)
            .field("resolver", &self.resolver.as_ref().map(|_| "<fn>"))
            .field("messages", &self.messages)
            .finish()
    }
}

/// Evaluate `rules` against `values`.
///
/// Every rule of every field is evaluated; failures are reported in rule
/// order, each with a `label` parameter. Fields without failures are absent
/// from the result. Pure: inputs are not modified and identical inputs give
/// identical output.
///
/// # Example
///
/// ```rust
/// use fform_validate::{ConstraintSet, FieldValues, ValidateOptions, validate};
///
/// let rules = ConstraintSet::new().required("phone").length("password", 6, 100);
/// let values = FieldValues::new().with("phone", "").with("password", "abc");
/// let options = ValidateOptions::new().alias("phone", "Phone number");
///
/// let errors = validate(&rules, &values, &options);
/// assert_eq!(errors.messages("phone"), ["Phone number is required"]);
/// assert_eq!(
///     errors.messages("password"),
///     ["password is too short (minimum is 6 characters)"]
/// );
/// ```
#[must_use]
pub fn validate(
    rules: &ConstraintSet,
    values: &FieldValues,
    options: &ValidateOptions,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for (field, constraints) in rules.iter() {
        let value = values.get(field);
        let label = options.label_for(field);
        let failures: Vec<_> = constraints
            .iter()
            .flat_map(|c| c.check(value, &options.messages))
            .map(|e| e.with_param("label", label.as_ref()))
            .collect();
        errors.extend(field, failures);
    }
    errors
}

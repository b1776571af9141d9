#![forbid(unsafe_code)]

//! Translated strings for the sign-in screen.

use std::collections::HashMap;

/// Translation lookup.
pub trait Translator {
    /// The phrase for `key`. Unknown keys come back as the key itself.
    fn translate(&self, key: &str) -> String;
}

/// Keys used by the sign-in screen.
pub mod keys {
    pub const LABEL_PHONE: &str = "screen.signIn.form.label.phone";
    pub const LABEL_PASSWORD: &str = "screen.signIn.form.label.password";
    pub const PLACEHOLDER_PHONE: &str = "screen.signIn.form.placeholder.phone";
    pub const PLACEHOLDER_PASSWORD: &str = "screen.signIn.form.placeholder.password";
    pub const BUTTON_SIGN_IN: &str = "screen.signIn.button.signIn";
    pub const BUTTON_FORGOT_PASSWORD: &str = "screen.signIn.button.forgotPassword";
    pub const TAB_SIGN_IN: &str = "screen.signIn.phrase.signIn";
    pub const TAB_SIGN_UP: &str = "screen.signIn.phrase.signUp";
    pub const TITLE: &str = "screen.signIn.phrase.bfast";
    pub const DESCRIPTION: &str = "screen.signIn.phrase.importantApp";
    pub const INSTRUCTION: &str = "screen.signIn.phrase.useBfast";
}

/// In-memory phrase table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    phrases: HashMap<String, String>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, phrase: impl Into<String>) -> Self {
        self.phrases.insert(key.into(), phrase.into());
        self
    }

    /// The English sign-in phrases.
    #[must_use]
    pub fn english() -> Self {
        Self::new()
            .with(keys::LABEL_PHONE, "Phone number")
            .with(keys::LABEL_PASSWORD, "Password")
            .with(keys::PLACEHOLDER_PHONE, "555 123 4567")
            .with(keys::PLACEHOLDER_PASSWORD, "At least 6 characters")
            .with(keys::BUTTON_SIGN_IN, "Sign in")
            .with(keys::BUTTON_FORGOT_PASSWORD, "Forgot password?")
            .with(keys::TAB_SIGN_IN, "Sign in")
            .with(keys::TAB_SIGN_UP, "Sign up")
            .with(keys::TITLE, "bfast")
            .with(keys::DESCRIPTION, "The most important app of the morning")
            .with(
                keys::INSTRUCTION,
                "Use *bfast* to order breakfast and pay for it in *one tap*",
            )
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        match self.phrases.get(key) {
            Some(phrase) => phrase.clone(),
            None => {
                tracing::debug!(key, "missing translation");
                key.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_has_every_key() {
        let catalog = Catalog::english();
        for key in [
            keys::LABEL_PHONE,
            keys::LABEL_PASSWORD,
            keys::PLACEHOLDER_PHONE,
            keys::PLACEHOLDER_PASSWORD,
            keys::BUTTON_SIGN_IN,
            keys::BUTTON_FORGOT_PASSWORD,
            keys::TAB_SIGN_IN,
            keys::TAB_SIGN_UP,
            keys::TITLE,
            keys::DESCRIPTION,
            keys::INSTRUCTION,
        ] {
            assert_ne!(catalog.translate(key), key, "{key} untranslated");
        }
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        assert_eq!(Catalog::new().translate("a.b"), "a.b");
    }
}

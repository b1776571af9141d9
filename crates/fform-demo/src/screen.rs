#![forbid(unsafe_code)]

//! The sign-in screen: configuration, validation, submission and navigation
//! wired onto a [`Form`].

use std::cell::Cell;
use std::rc::Rc;

use fform::{
    ConstraintSet, Delimited, FieldValues, Form, FormConfig, Fragment, SubmissionError,
    SubmitOutcome, ValidateOptions, replace_with,
};
use futures::future::LocalBoxFuture;

use crate::cli::SignInConfig;
use crate::i18n::{Translator, keys};
use crate::services::{Navigator, Route, Session, SessionClient, SessionStore};

/// Field names.
pub const PHONE: &str = "phone";
pub const PASSWORD: &str = "password";
pub const WITH_REFRESH: &str = "withRefresh";

/// Markup marking highlighted words in translated phrases.
const HIGHLIGHT: (&str, &str) = ("*", "*");

/// Which input has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Phone,
    Password,
}

/// Tabs above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    SignIn,
    SignUp,
}

/// A highlighted word of the instruction phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// List key: match text followed by its ordinal.
    pub key: String,
    pub text: String,
}

/// Collaborators injected into the screen.
#[derive(Clone)]
pub struct SignInDeps {
    pub translator: Rc<dyn Translator>,
    pub client: Rc<dyn SessionClient>,
    pub store: Rc<SessionStore>,
    pub navigator: Rc<dyn Navigator>,
}

/// Constraints for the sign-in form.
#[must_use]
pub fn sign_in_rules() -> ConstraintSet {
    ConstraintSet::new()
        .required(PHONE)
        .required(PASSWORD)
        .length(PASSWORD, 6, 100)
}

/// Validation options with translated field labels.
#[must_use]
pub fn validate_options(translator: &dyn Translator) -> ValidateOptions {
    ValidateOptions::new()
        .alias(PHONE, translator.translate(keys::LABEL_PHONE))
        .alias(PASSWORD, translator.translate(keys::LABEL_PASSWORD))
}

/// Initial values from the credential config.
#[must_use]
pub fn initial_values(config: &SignInConfig) -> FieldValues {
    FieldValues::new()
        .with(PHONE, config.phone.as_str())
        .with(PASSWORD, config.password.as_str())
        .with(WITH_REFRESH, config.with_refresh)
}

/// Split a phrase into plain text and highlighted words.
///
/// `"Use *bfast* now"` yields `Text("Use ")`, `Node(bfast)`, `Text(" now")`.
#[must_use]
pub fn instruction(phrase: &str) -> Vec<Fragment<'_, Highlight>> {
    let markup = Delimited::new(HIGHLIGHT.0, HIGHLIGHT.1);
    replace_with(phrase, &markup, |token, index| Highlight {
        key: format!("{token}{index}"),
        text: markup.inner(token).to_string(),
    })
}

/// The sign-in screen.
pub struct SignInScreen {
    form: Form,
    focus: Cell<Focus>,
    deps: SignInDeps,
}

impl SignInScreen {
    /// Mount the screen.
    #[must_use]
    pub fn new(config: &SignInConfig, deps: SignInDeps) -> Self {
        let client = Rc::clone(&deps.client);
        let store = Rc::clone(&deps.store);
        let form_config = FormConfig::new(initial_values(config))
            .constraints(sign_in_rules(), validate_options(deps.translator.as_ref()))
            .on_submit(move |values: FieldValues| {
                sign_in(client.as_ref(), Rc::clone(&store), &values)
            });
        Self {
            form: Form::new(form_config),
            focus: Cell::new(Focus::Phone),
            deps,
        }
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus.get()
    }

    /// Translate a key.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.deps.translator.translate(key)
    }

    pub fn set_phone(&self, phone: &str) -> bool {
        self.form.set_value(PHONE, phone)
    }

    pub fn set_password(&self, password: &str) -> bool {
        self.form.set_value(PASSWORD, password)
    }

    /// "Next" on the phone keyboard moves focus to the password.
    pub fn handle_submit_phone(&self) {
        self.focus.set(Focus::Password);
    }

    /// The sign-in button.
    pub fn handle_submit(&self) -> LocalBoxFuture<'static, SubmitOutcome> {
        self.form.handle_submit()
    }

    pub fn handle_tab_change(&self, tab: Tab) {
        if tab == Tab::SignUp {
            self.deps.navigator.navigate(Route::SignUp);
        }
    }

    /// Open password recovery with the phone typed so far.
    pub fn handle_forgot_password(&self) {
        let phone = self.form.text(PHONE).unwrap_or_default();
        self.deps.navigator.navigate(Route::ForgotPassword { phone });
    }

    /// Title, description and the highlighted instruction, one per line.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let phrase = self.t(keys::INSTRUCTION);
        let instruction: String = instruction(&phrase)
            .into_iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.to_string(),
                Fragment::Node(highlight) => format!("[{}]", highlight.text),
            })
            .collect();
        vec![
            format!(
                "{} | {}",
                self.t(keys::TAB_SIGN_IN).to_uppercase(),
                self.t(keys::TAB_SIGN_UP)
            ),
            self.t(keys::TITLE),
            self.t(keys::DESCRIPTION),
            instruction,
        ]
    }
}

impl std::fmt::Debug for SignInScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInScreen")
            .field("form", &self.form)
            .field("focus", &self.focus.get())
            .finish_non_exhaustive()
    }
}

/// Run the mutation and record the session on success.
fn sign_in(
    client: &dyn SessionClient,
    store: Rc<SessionStore>,
    values: &FieldValues,
) -> LocalBoxFuture<'static, Result<(), SubmissionError>> {
    let request = client.sign_in_by_phone(values.to_json());
    Box::pin(async move {
        let response = request.await.map_err(SubmissionError::from_error)?;
        let session = Session::from_response(&response).map_err(SubmissionError::from_error)?;
        store.sign_in_success(session);
        Ok(())
    })
}

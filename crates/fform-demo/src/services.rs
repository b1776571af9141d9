#![forbid(unsafe_code)]

//! Collaborators of the sign-in screen: the session mutation client, the
//! session store and the navigator.

use std::cell::RefCell;
use std::fmt;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Session client
// ---------------------------------------------------------------------------

/// Errors from the session client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server refused the credentials.
    Rejected(String),
    /// The response did not contain the expected field.
    MissingField(&'static str),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "sign-in rejected: {reason}"),
            Self::MissingField(path) => write!(f, "malformed sign-in response: missing {path}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// The sign-in mutation.
pub trait SessionClient {
    /// Run `signInByPhone` with the form values as variables.
    fn sign_in_by_phone(&self, variables: Value) -> LocalBoxFuture<'static, Result<Value, ClientError>>;
}

/// Offline client that answers every request locally.
#[derive(Debug, Default)]
pub struct StubSessionClient {
    fail: bool,
    requests: RefCell<Vec<Value>>,
}

impl StubSessionClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every request.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Variables of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.requests.borrow().clone()
    }
}

impl SessionClient for StubSessionClient {
    fn sign_in_by_phone(&self, variables: Value) -> LocalBoxFuture<'static, Result<Value, ClientError>> {
        tracing::info!(phone = ?variables.get("phone"), "signInByPhone");
        let phone = variables
            .get("phone")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let with_refresh = variables
            .get("withRefresh")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        self.requests.borrow_mut().push(variables);

        let result = if self.fail {
            Err(ClientError::Rejected("invalid phone or password".into()))
        } else {
            Ok(json!({
                "data": {
                    "signInByPhone": {
                        "accessToken": format!("access-{phone}"),
                        "refreshToken": with_refresh.then(|| format!("refresh-{phone}")),
                    }
                }
            }))
        };
        futures::future::ready(result).boxed_local()
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// Tokens of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Extract the session from a `signInByPhone` response.
    pub fn from_response(response: &Value) -> Result<Self, ClientError> {
        let payload = response
            .pointer("/data/signInByPhone")
            .ok_or(ClientError::MissingField("data.signInByPhone"))?;
        let token = payload
            .get("accessToken")
            .and_then(Value::as_str)
            .ok_or(ClientError::MissingField("accessToken"))?;
        let refresh_token = payload
            .get("refreshToken")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(Self {
            token: token.to_string(),
            refresh_token,
        })
    }
}

/// Holds the current session.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RefCell<Option<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful sign-in.
    pub fn sign_in_success(&self, session: Session) {
        tracing::info!(refresh = session.refresh_token.is_some(), "signed in");
        *self.session.borrow_mut() = Some(session);
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.borrow().is_some()
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Screens reachable from sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignUp,
    ForgotPassword { phone: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignUp => f.write_str("SignUp"),
            Self::ForgotPassword { phone } => write!(f, "ForgotPassword {{ phone: {phone:?} }}"),
        }
    }
}

/// Navigation stack.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Navigator that records routes instead of presenting screens.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: RefCell<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(%route, "navigate");
        self.routes.borrow_mut().push(route);
    }
}

//! Login, registration, logout and the start-up token check.
//!
//! Input is validated locally first; a form with blank fields never reaches
//! the network. Remote failures are turned into the short messages the
//! login and registration screens show.

use crate::session::Session;
use fb_core::{ApiError, Credentials, FormBackend, Registration, User};
use std::collections::BTreeMap;

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials. Try again.";
pub const MSG_LOGIN_FAILED: &str = "An error occurred.";
pub const MSG_REGISTER_FAILED: &str = "Registration failed. Try again.";
pub const MSG_REGISTERED: &str = "Registration successful! You can now log in.";
pub const MSG_LOGGED_IN: &str = "Login successful!";

const MIN_PASSWORD_CHARS: usize = 6;

/// Per-field messages shown under the offending inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialErrors {
    fields: BTreeMap<String, String>,
}

impl CredentialErrors {
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.fields.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), AuthError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Invalid(self))
        }
    }
}

/// Server-side validation errors keep only the first message per field.
impl From<fb_core::api::FieldErrors> for CredentialErrors {
    fn from(errors: fb_core::api::FieldErrors) -> Self {
        let fields = errors
            .into_iter()
            .filter_map(|(field, messages)| messages.into_iter().next().map(|m| (field, m)))
            .collect();
        Self { fields }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// Field-level problems, shown inline.
    #[error("some fields need attention")]
    Invalid(CredentialErrors),
    /// Anything else, as a message for an error notification.
    #[error("{0}")]
    Failed(String),
}

impl AuthError {
    pub fn field_errors(&self) -> Option<&CredentialErrors> {
        match self {
            AuthError::Invalid(errors) => Some(errors),
            AuthError::Failed(_) => None,
        }
    }
}

pub fn validate_login(credentials: &Credentials) -> Result<(), AuthError> {
    let mut errors = CredentialErrors::default();
    if credentials.email.trim().is_empty() {
        errors.insert("email", "Email is required.");
    }
    if credentials.password.trim().is_empty() {
        errors.insert("password", "Password is required.");
    }
    errors.into_result()
}

pub fn validate_registration(registration: &Registration) -> Result<(), AuthError> {
    let mut errors = CredentialErrors::default();
    if registration.name.trim().is_empty() {
        errors.insert("name", "Full Name is required.");
    }
    if registration.email.trim().is_empty() {
        errors.insert("email", "Email is required.");
    }
    if registration.password.trim().is_empty() {
        errors.insert("password", "Password is required.");
    } else if registration.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert("password", "Password must be at least 6 characters.");
    }
    errors.into_result()
}

/// Sign in and start `session` with the token and the user record fetched
/// with it. On failure the session is left as it was.
pub async fn login<B: FormBackend>(
    backend: &B,
    session: &mut Session,
    credentials: &Credentials,
) -> Result<User, AuthError> {
    validate_login(credentials)?;

    let response = backend.login(credentials).await.map_err(|e| {
        log::warn!("auth: login failed: {e}");
        match e {
            ApiError::Unauthorized => AuthError::Failed(MSG_INVALID_CREDENTIALS.into()),
            _ => AuthError::Failed(MSG_LOGIN_FAILED.into()),
        }
    })?;

    let user = backend.current_user(&response.token).await.map_err(|e| {
        log::warn!("auth: user lookup after login failed: {e}");
        AuthError::Failed(MSG_LOGIN_FAILED.into())
    })?;

    session.begin(response.token, user.clone());
    Ok(user)
}

/// Create an account. Does not sign in.
pub async fn register<B: FormBackend>(
    backend: &B,
    registration: &Registration,
) -> Result<User, AuthError> {
    validate_registration(registration)?;

    match backend.register(registration).await {
        Ok(user) => {
            log::info!("auth: registered {}", registration.email);
            Ok(user)
        }
        Err(ApiError::Validation(errors)) => Err(AuthError::Invalid(errors.into())),
        Err(e) => {
            log::warn!("auth: registration failed: {e}");
            let message = e.server_message().unwrap_or(MSG_REGISTER_FAILED);
            Err(AuthError::Failed(message.to_string()))
        }
    }
}

/// Tell the backend, then clear the session whatever it answered.
pub async fn logout<B: FormBackend>(backend: &B, session: &mut Session) {
    if let Some(token) = session.token()
        && let Err(e) = backend.logout(token).await
    {
        log::warn!("auth: remote logout failed: {e}");
    }
    session.clear();
}

/// Verify a restored token. Any failure clears the session.
/// Returns whether the session is still good.
pub async fn check<B: FormBackend>(backend: &B, session: &mut Session) -> bool {
    let Some(token) = session.token().map(str::to_string) else {
        return false;
    };
    match backend.current_user(&token).await {
        Ok(user) => {
            session.begin(token, user);
            true
        }
        Err(e) => {
            log::warn!("auth: stored token rejected: {e}");
            session.clear();
            false
        }
    }
}

// ─── Gate ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Builder,
    Login,
    Register,
}

impl Route {
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Builder)
    }
}

/// Decides which screen a request for `requested` actually lands on.
pub struct Gate;

impl Gate {
    pub fn resolve(session: &Session, requested: Route) -> Route {
        if requested.requires_auth() && !session.is_authenticated() {
            Route::Login
        } else {
            requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn login_requires_both_fields() {
        let err = validate_login(&Credentials {
            email: "  ".into(),
            password: String::new(),
        })
        .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get("email"), Some("Email is required."));
        assert_eq!(fields.get("password"), Some("Password is required."));
    }

    #[test]
    fn registration_password_length() {
        let err = validate_registration(&Registration {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "12345".into(),
        })
        .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().iter().collect::<Vec<_>>(),
            vec![("password", "Password must be at least 6 characters.")]
        );
        assert!(
            validate_registration(&Registration {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "123456".into(),
            })
            .is_ok()
        );
    }

    #[test]
    fn server_field_errors_keep_first_message() {
        let mut raw = fb_core::api::FieldErrors::new();
        raw.insert(
            "email".into(),
            vec!["The email has already been taken.".into(), "second".into()],
        );
        raw.insert("name".into(), vec![]);
        let errors = CredentialErrors::from(raw);
        assert_eq!(errors.get("email"), Some("The email has already been taken."));
        assert_eq!(errors.get("name"), None);
    }

    #[test]
    fn gate_redirects_anonymous_builder() {
        let session = Session::default();
        assert_eq!(Gate::resolve(&session, Route::Builder), Route::Login);
        assert_eq!(Gate::resolve(&session, Route::Register), Route::Register);
    }
}

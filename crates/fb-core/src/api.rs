//! Contract of the REST collaborator that stores forms and users.
//!
//! The builder never talks HTTP directly; it goes through [`FormBackend`].
//! `fb-client` implements it with `reqwest`, tests implement it in memory.
//! Every call except register/login takes the session's bearer token.

use crate::id::FormId;
use crate::sequence::FieldSequence;
use crate::wire::Form;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name → messages, as returned by a rejected registration.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Anything else the backend sends along.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// What a save request carries.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub title: String,
    pub fields: FieldSequence,
}

/// Errors a backend call can end in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid or expired credentials.
    #[error("not authenticated")]
    Unauthorized,
    /// The resource does not exist or is not owned by the caller.
    #[error("not found")]
    NotFound,
    #[error("validation failed")]
    Validation(FieldErrors),
    /// The server answered, but not with what was asked for.
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("server error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Remote {
        status: u16,
        message: Option<String>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// The server-provided explanation, when there is one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Remote { message, .. } => message.as_deref(),
            ApiError::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

/// The REST collaborator.
///
/// The builder is single-threaded and drives one call at a time, so the
/// futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait FormBackend {
    async fn register(&self, registration: &Registration) -> Result<User, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn list_forms(&self, token: &str) -> Result<Vec<Form>, ApiError>;

    async fn get_form(&self, token: &str, id: FormId) -> Result<Form, ApiError>;

    /// Create-style save; the returned form carries the assigned id.
    async fn save_form(&self, token: &str, draft: &FormDraft) -> Result<Form, ApiError>;

    async fn delete_form(&self, token: &str, id: FormId) -> Result<(), ApiError>;
}

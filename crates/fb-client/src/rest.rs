//! [`FormBackend`] over the REST API, using `reqwest`.
//!
//! Authenticated calls carry `Authorization: Bearer <token>` and a JSON
//! content type. Responses are mapped onto [`ApiError`] by status code;
//! bodies that are wrapped in an envelope (`{"data": ...}`, `{"form": ...}`)
//! are unwrapped before decoding.

use crate::config::ClientConfig;
use fb_core::api::FieldErrors;
use fb_core::{
    ApiError, Credentials, Form, FormBackend, FormDraft, FormId, LoginResponse, Registration,
    SaveRequest, User, forms_from_value,
};
use reqwest::{Method, RequestBuilder, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const UNTITLED_FORM: &str = "Untitled Form";
pub const DELETE_CONFIRMATION: &str = "Form deleted successfully";

#[derive(Debug, Clone)]
pub struct RestBackend {
    base_url: String,
    http: reqwest::Client,
}

impl RestBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.public(method, path)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let error = error_for_status(status.as_u16(), &body);
            log::warn!("rest: HTTP {}: {error}", status.as_u16());
            return Err(error);
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl FormBackend for RestBackend {
    async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let body = self
            .send(self.public(Method::POST, "/register").json(registration))
            .await?;
        decode(unwrap_envelope(body, &["user", "data"]))
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = self
            .send(self.public(Method::POST, "/login").json(credentials))
            .await?;
        decode(body)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.send(
            self.authed(Method::POST, "/logout", token)
                .json(&serde_json::json!({})),
        )
        .await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let body = self.send(self.authed(Method::GET, "/user", token)).await?;
        if body.is_null() {
            return Err(ApiError::Unauthorized);
        }
        decode(unwrap_envelope(body, &["user", "data"]))
    }

    async fn list_forms(&self, token: &str) -> Result<Vec<Form>, ApiError> {
        let body = self
            .send(self.authed(Method::GET, "/forms/list", token))
            .await?;
        match unwrap_envelope(body, &["forms", "data"]) {
            Value::Null => Ok(Vec::new()),
            other => forms_from_value(other).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    async fn get_form(&self, token: &str, id: FormId) -> Result<Form, ApiError> {
        let body = self
            .send(self.authed(Method::GET, &format!("/forms/{id}"), token))
            .await?;
        match unwrap_envelope(body, &["form", "data"]) {
            Value::Null => Err(ApiError::NotFound),
            other => decode(other),
        }
    }

    async fn save_form(&self, token: &str, draft: &FormDraft) -> Result<Form, ApiError> {
        let title = if draft.title.trim().is_empty() {
            UNTITLED_FORM
        } else {
            draft.title.as_str()
        };
        let request = SaveRequest {
            title,
            fields: &draft.fields,
        };
        let body = self
            .send(self.authed(Method::POST, "/forms/save", token).json(&request))
            .await?;
        let form: Form = decode(unwrap_envelope(body, &["form", "data"]))?;
        log::info!("rest: saved \"{title}\" as {:?}", form.id);
        Ok(form)
    }

    async fn delete_form(&self, token: &str, id: FormId) -> Result<(), ApiError> {
        let body = self
            .send(self.authed(Method::DELETE, &format!("/forms/delete/{id}"), token))
            .await?;
        let message = body.get("message").and_then(Value::as_str);
        if message == Some(DELETE_CONFIRMATION) {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                message.unwrap_or("delete was not confirmed").to_string(),
            ))
        }
    }
}

// ─── Response mapping ────────────────────────────────────────────────────

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `{"<key>": inner}` → `inner` for the first key present; anything else
/// passes through.
fn unwrap_envelope(value: Value, keys: &[&str]) -> Value {
    if let Value::Object(map) = &value
        && let Some(inner) = keys.iter().find_map(|k| map.get(*k))
        && (inner.is_object() || inner.is_array())
    {
        return inner.clone();
    }
    value
}

/// Map a non-success status and its body onto an [`ApiError`].
pub fn error_for_status(status: u16, body: &[u8]) -> ApiError {
    let json: Option<Value> = serde_json::from_slice(body).ok();
    let validation = match status {
        422 => json.as_ref().and_then(field_errors),
        _ => None,
    };
    if let Some(errors) = validation {
        return ApiError::Validation(errors);
    }
    match status {
        401 => ApiError::Unauthorized,
        403 | 404 => ApiError::NotFound,
        _ => {
            let message = json.as_ref().and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(Value::as_str))
                    .map(str::to_string)
            });
            ApiError::Remote { status, message }
        }
    }
}

/// `{"errors": {"email": ["taken"], "name": "required"}}` → field errors.
fn field_errors(body: &Value) -> Option<FieldErrors> {
    let map = body.get("errors")?.as_object()?;
    let errors = map
        .iter()
        .map(|(field, messages)| {
            let list = match messages {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            (field.clone(), list)
        })
        .collect();
    Some(errors)
}

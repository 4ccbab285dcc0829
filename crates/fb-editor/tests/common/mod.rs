//! In-memory stand-in for the REST backend.

#![allow(dead_code)]

use fb_core::{
    ApiError, Credentials, FieldSequence, Form, FormBackend, FormDraft, FormId, LoginResponse,
    Registration, User,
};
use fb_editor::Session;
use serde_json::Map;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const TOKEN: &str = "tok-ada";

pub fn ada() -> User {
    User {
        id: Some(1),
        name: "Ada".into(),
        email: "ada@example.com".into(),
        extra: Map::new(),
    }
}

pub fn signed_in() -> Session {
    let mut session = Session::default();
    session.begin(TOKEN, ada());
    session
}

#[derive(Default)]
struct State {
    forms: BTreeMap<u64, Form>,
    next_id: u64,
    calls: Vec<&'static str>,
    fail_next: Option<ApiError>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: RefCell<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(self, title: &str, fields: FieldSequence) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            let mut form = Form::new(title, fields);
            form.id = Some(FormId::new(id));
            state.forms.insert(id, form);
        }
        self
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn stored(&self, id: FormId) -> Option<Form> {
        self.state.borrow().forms.get(&id.get()).cloned()
    }

    pub fn stored_count(&self) -> usize {
        self.state.borrow().forms.len()
    }

    fn enter(&self, call: &'static str, token: Option<&str>) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        match token {
            Some(t) if t != TOKEN => Err(ApiError::Unauthorized),
            _ => Ok(()),
        }
    }
}

impl FormBackend for FakeBackend {
    async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.enter("register", None)?;
        Ok(User {
            id: Some(2),
            name: registration.name.clone(),
            email: registration.email.clone(),
            extra: Map::new(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.enter("login", None)?;
        if credentials.email == "ada@example.com" && credentials.password == "secret1" {
            Ok(LoginResponse {
                token: TOKEN.into(),
                user: None,
            })
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.enter("logout", Some(token))
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.enter("current_user", Some(token))?;
        Ok(ada())
    }

    async fn list_forms(&self, token: &str) -> Result<Vec<Form>, ApiError> {
        self.enter("list_forms", Some(token))?;
        Ok(self.state.borrow().forms.values().cloned().collect())
    }

    async fn get_form(&self, token: &str, id: FormId) -> Result<Form, ApiError> {
        self.enter("get_form", Some(token))?;
        self.stored(id).ok_or(ApiError::NotFound)
    }

    async fn save_form(&self, token: &str, draft: &FormDraft) -> Result<Form, ApiError> {
        self.enter("save_form", Some(token))?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        let mut form = Form::new(draft.title.clone(), draft.fields.clone());
        form.id = Some(FormId::new(id));
        state.forms.insert(id, form.clone());
        Ok(form)
    }

    async fn delete_form(&self, token: &str, id: FormId) -> Result<(), ApiError> {
        self.enter("delete_form", Some(token))?;
        match self.state.borrow_mut().forms.remove(&id.get()) {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound),
        }
    }
}

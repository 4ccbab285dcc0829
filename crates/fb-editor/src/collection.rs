//! Form collection manager: the user's forms, which one is open, and the
//! canvas holding its fields.
//!
//! Every remote operation takes the [`Session`] explicitly. Local state only
//! changes after the backend has answered successfully; failures end up as
//! notifications. An authentication failure on any call also clears the
//! session, which sends the host back to the login screen.

use crate::canvas::Canvas;
use crate::notify::Notifications;
use crate::properties::PropertiesEditor;
use crate::session::Session;
use fb_core::{
    ApiError, Field, FieldId, FieldKind, FieldSequence, Form, FormBackend, FormDraft,
    FormId, LintSeverity, lint_fields,
};

pub const MSG_FETCH_FAILED: &str = "Failed to fetch forms";
pub const MSG_ADDED: &str = "New form added successfully";
pub const MSG_ADD_FAILED: &str = "Failed to add form";
pub const MSG_NOT_FOUND: &str = "Form not found or unauthorized";
pub const MSG_NO_SELECTION: &str = "No form selected!";
pub const MSG_EMPTY_FORM: &str = "Cannot save an empty form. Please add fields.";
pub const MSG_SAVED: &str = "Form saved successfully!";
pub const MSG_SAVE_FAILED: &str = "Failed to save form";
pub const MSG_REMOVED: &str = "Form removed successfully";
pub const MSG_REMOVE_FAILED: &str = "Failed to delete form";

pub struct FormCollection<B> {
    backend: B,
    forms: Vec<Form>,
    selected: Option<FormId>,
    canvas: Canvas,
    properties: PropertiesEditor,
    notifications: Notifications,
}

impl<B: FormBackend> FormCollection<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            forms: Vec::new(),
            selected: None,
            canvas: Canvas::new(),
            properties: PropertiesEditor::new(),
            notifications: Notifications::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn selected(&self) -> Option<FormId> {
        self.selected
    }

    pub fn selected_form(&self) -> Option<&Form> {
        let id = self.selected?;
        self.forms.iter().find(|f| f.id == Some(id))
    }

    /// Title of the open form, or "" when none is open.
    pub fn title(&self) -> &str {
        self.selected_form().map_or("", |f| f.title.as_str())
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn fields(&self) -> &FieldSequence {
        self.canvas.fields()
    }

    pub fn properties(&self) -> &PropertiesEditor {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertiesEditor {
        &mut self.properties
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    // ─── Local editing ───────────────────────────────────────────────────

    /// Open the properties editor on a field of the current form.
    pub fn select_field(&mut self, id: FieldId) -> bool {
        self.properties.select_id(&self.canvas, id)
    }

    /// Write the properties draft back to the canvas.
    pub fn save_properties(&mut self) -> bool {
        match self.properties.save(&mut self.canvas) {
            Ok(changed) => changed,
            Err(e) => {
                self.notifications.error(e.to_string());
                false
            }
        }
    }

    /// Edit the open form's title locally. Sent with the next save.
    pub fn rename_selected(&mut self, title: impl Into<String>) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        match self.forms.iter_mut().find(|f| f.id == Some(id)) {
            Some(form) => {
                form.title = title.into();
                true
            }
            None => false,
        }
    }

    // ─── Remote operations ───────────────────────────────────────────────

    /// Fetch the user's forms and open the first one.
    pub async fn load(&mut self, session: &mut Session) -> bool {
        let Some(token) = self.token(session, MSG_FETCH_FAILED) else {
            return false;
        };
        match self.backend.list_forms(&token).await {
            Ok(forms) => {
                log::info!("collection: {} forms", forms.len());
                self.forms = forms;
                match self.forms.first() {
                    Some(first) => {
                        self.selected = first.id;
                        self.canvas.load(first.fields.clone());
                    }
                    None => {
                        self.selected = None;
                        self.canvas.clear();
                    }
                }
                self.properties.cancel();
                true
            }
            Err(e) => {
                self.fail(session, &e, MSG_FETCH_FAILED);
                false
            }
        }
    }

    /// Create `New Form N` holding one default text field, and open it.
    pub async fn add_form(&mut self, session: &mut Session) -> Option<FormId> {
        let token = self.token(session, MSG_ADD_FAILED)?;
        let fields = match FieldSequence::from_fields(vec![Field::new(
            FieldId::fresh(),
            FieldKind::Text,
        )]) {
            Ok(fields) => fields,
            Err(e) => {
                log::error!("collection: cannot seed new form: {e}");
                self.notifications.error(MSG_ADD_FAILED);
                return None;
            }
        };
        let draft = FormDraft {
            title: format!("New Form {}", self.forms.len() + 1),
            fields,
        };

        let mut saved = match self.backend.save_form(&token, &draft).await {
            Ok(form) => form,
            Err(e) => {
                self.fail(session, &e, MSG_ADD_FAILED);
                return None;
            }
        };
        let Some(id) = saved.id else {
            log::error!("collection: created form came back without an id");
            self.notifications.error(MSG_ADD_FAILED);
            return None;
        };
        if saved.fields.is_empty() {
            saved.fields = draft.fields;
        }
        if saved.title.is_empty() {
            saved.title = draft.title;
        }

        log::info!("collection: created {id:?}");
        self.canvas.load(saved.fields.clone());
        self.forms.push(saved);
        self.selected = Some(id);
        self.properties.cancel();
        self.notifications.success(MSG_ADDED);
        Some(id)
    }

    /// Open form `id`. On any failure nothing stays open.
    pub async fn select_form(&mut self, session: &mut Session, id: FormId) -> bool {
        self.properties.cancel();
        let Some(token) = self.token(session, MSG_NOT_FOUND) else {
            self.close();
            return false;
        };
        match self.backend.get_form(&token, id).await {
            Ok(form) => {
                log::debug!("collection: opened {id:?} ({} fields)", form.fields.len());
                self.canvas.load(form.fields.clone());
                self.selected = Some(id);
                match self.forms.iter_mut().find(|f| f.id == Some(id)) {
                    Some(local) => local.fields = form.fields,
                    None => self.forms.push(form),
                }
                true
            }
            Err(e) => {
                self.close();
                self.fail(session, &e, MSG_NOT_FOUND);
                false
            }
        }
    }

    /// Send the open form's title and fields. Refused (with a warning and
    /// no request) when nothing is open or the form has no fields.
    pub async fn save_form(&mut self, session: &mut Session) -> bool {
        let Some(title) = self.selected_form().map(|f| f.title.clone()) else {
            self.notifications.warning(MSG_NO_SELECTION);
            return false;
        };
        if self.canvas.fields().is_empty() {
            self.notifications.warning(MSG_EMPTY_FORM);
            return false;
        }
        let draft = FormDraft {
            title,
            fields: self.canvas.fields().clone(),
        };

        for diag in lint_fields(&draft.fields) {
            match diag.severity {
                LintSeverity::Warning => log::warn!("lint[{}]: {}", diag.rule, diag.message),
                LintSeverity::Info => log::debug!("lint[{}]: {}", diag.rule, diag.message),
            }
        }

        let Some(token) = self.token(session, MSG_SAVE_FAILED) else {
            return false;
        };
        match self.backend.save_form(&token, &draft).await {
            Ok(saved) => {
                log::info!("collection: saved {:?} as {:?}", self.selected, saved.id);
                if let Some(id) = self.selected
                    && let Some(local) = self.forms.iter_mut().find(|f| f.id == Some(id))
                {
                    local.fields = draft.fields;
                }
                self.notifications.success(MSG_SAVED);
                true
            }
            Err(e) => {
                self.fail(session, &e, MSG_SAVE_FAILED);
                false
            }
        }
    }

    /// Delete form `id`, then open the first remaining form (if any).
    pub async fn remove_form(&mut self, session: &mut Session, id: FormId) -> bool {
        let Some(token) = self.token(session, MSG_REMOVE_FAILED) else {
            return false;
        };
        if let Err(e) = self.backend.delete_form(&token, id).await {
            self.fail(session, &e, MSG_REMOVE_FAILED);
            return false;
        }

        log::info!("collection: deleted {id:?}");
        self.forms.retain(|f| f.id != Some(id));
        self.notifications.success(MSG_REMOVED);
        match self.forms.first().and_then(|f| f.id) {
            Some(next) => {
                self.select_form(session, next).await;
            }
            None => self.close(),
        }
        true
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn close(&mut self) {
        self.selected = None;
        self.canvas.clear();
        self.properties.cancel();
    }

    /// The session's token, or the same treatment as a rejected token.
    fn token(&mut self, session: &mut Session, message: &str) -> Option<String> {
        let token = session.token().map(str::to_string);
        if token.is_none() {
            self.fail(session, &ApiError::Unauthorized, message);
        }
        token
    }

    fn fail(&mut self, session: &mut Session, error: &ApiError, fallback: &str) {
        log::error!("collection: {fallback}: {error}");
        if error.is_auth_failure() {
            session.clear();
        }
        let message = match error {
            ApiError::Unauthorized | ApiError::NotFound => fallback,
            _ => error.server_message().unwrap_or(fallback),
        };
        self.notifications.error(message);
    }
}

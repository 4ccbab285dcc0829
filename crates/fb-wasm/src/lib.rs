//! WASM bridge for FB: exposes the form builder engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the builder
//! page. The page owns rendering and the REST calls; everything that edits
//! the field sequence goes through [`FormCanvas`].

mod storage;

pub use storage::BrowserSessionStore;

use fb_core::{
    FieldId, FieldKind, LintSeverity, PALETTE, ValidationRule, decode_fields, encode_fields,
    lint_fields,
};
use fb_editor::{Canvas, Gate, PropertiesEditor, Route, Session, ShortcutAction, ShortcutMap};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The main WASM-facing builder controller.
///
/// Holds the canvas (field sequence, drag session, undo history) and the
/// properties editor. All interaction from the page goes through this
/// struct.
#[wasm_bindgen]
pub struct FormCanvas {
    canvas: Canvas,
    properties: PropertiesEditor,
}

impl Default for FormCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl FormCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        seed_field_ids();
        Self {
            canvas: Canvas::new(),
            properties: PropertiesEditor::new(),
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the field sequence with the JSON array `json` (history is
    /// dropped). Returns `{"ok":true,"count":n}` or `{"ok":false,"error":"..."}`.
    pub fn load_fields_json(&mut self, json: &str) -> String {
        match decode_fields(json) {
            Ok(fields) => {
                let count = fields.len();
                self.properties.cancel();
                self.canvas.load(fields);
                ok(json!({ "count": count }))
            }
            Err(e) => fail(e),
        }
    }

    /// The field sequence in wire format.
    pub fn get_fields_json(&self) -> String {
        match encode_fields(self.canvas.fields()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("encode failed: {e}");
                "[]".to_string()
            }
        }
    }

    pub fn field_count(&self) -> usize {
        self.canvas.fields().len()
    }

    /// Label as shown on the form, with ` *` for required fields.
    pub fn display_label(&self, id: f64) -> String {
        field_id(id)
            .and_then(|id| self.canvas.fields().get_by_id(id))
            .map(|f| f.display_label())
            .unwrap_or_default()
    }

    /// Lint findings as `[{"fieldId","message","severity","rule"}]`.
    pub fn lint_json(&self) -> String {
        let diags: Vec<Value> = lint_fields(self.canvas.fields())
            .into_iter()
            .map(|d| {
                json!({
                    "fieldId": d.field_id.map(FieldId::get),
                    "message": d.message,
                    "severity": match d.severity {
                        LintSeverity::Warning => "warning",
                        LintSeverity::Info => "info",
                    },
                    "rule": d.rule,
                })
            })
            .collect();
        Value::Array(diags).to_string()
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Start dragging a palette item. `kind` is a field type name.
    pub fn begin_palette_drag(&mut self, kind: &str) -> bool {
        match kind.parse::<FieldKind>() {
            Ok(kind) => self.canvas.begin_palette_drag(kind),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn begin_field_drag(&mut self, index: usize) -> bool {
        self.canvas.begin_field_drag(index)
    }

    /// Pointer over the field at `index`. Returns true if the list reordered.
    pub fn hover(&mut self, index: usize) -> bool {
        self.canvas.hover(index)
    }

    /// Drop over the canvas. Returns the new field's id for palette drags.
    pub fn drop_on_canvas(&mut self) -> Option<f64> {
        self.canvas.drop_on_canvas().map(|id| id.get() as f64)
    }

    pub fn cancel_drag(&mut self) {
        self.canvas.cancel_drag();
    }

    pub fn is_dragging(&self) -> bool {
        self.canvas.drag().is_some()
    }

    // ─── Direct edits ────────────────────────────────────────────────────

    pub fn add_field(&mut self, kind: &str) -> Option<f64> {
        let kind = kind.parse::<FieldKind>().ok()?;
        self.canvas.add_field(kind).map(|id| id.get() as f64)
    }

    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        self.canvas.move_field(from, to).unwrap_or(false)
    }

    /// Delete a field. Closes the properties editor if it was open on it.
    pub fn remove_field(&mut self, id: f64) -> bool {
        let Some(id) = field_id(id) else {
            return false;
        };
        let removed = self.canvas.remove_field(id);
        if removed && self.properties.selected() == Some(id) {
            self.properties.cancel();
        }
        removed
    }

    pub fn undo(&mut self) -> bool {
        self.canvas.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.canvas.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.canvas.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.canvas.can_redo()
    }

    // ─── Preview ─────────────────────────────────────────────────────────

    pub fn set_preview(&mut self, preview: bool) {
        if preview {
            self.properties.cancel();
        }
        self.canvas.set_preview(preview);
    }

    pub fn is_preview(&self) -> bool {
        self.canvas.is_preview()
    }

    // ─── Properties editor ───────────────────────────────────────────────

    pub fn select_field(&mut self, id: f64) -> bool {
        match field_id(id) {
            Some(id) => self.properties.select_id(&self.canvas, id),
            None => false,
        }
    }

    /// The open draft, or `null` when no field is selected.
    pub fn get_draft_json(&self) -> String {
        let Some(d) = self.properties.draft() else {
            return "null".to_string();
        };
        json!({
            "id": d.target.get(),
            "type": d.kind.as_str(),
            "label": d.label,
            "placeholder": d.placeholder,
            "required": d.required,
            "validationRule": d.validation_rule.map(ValidationRule::as_str),
            "options": d.options,
            "showsOptions": self.properties.shows_options_editor(),
            "showsPlaceholder": self.properties.shows_placeholder_editor(),
        })
        .to_string()
    }

    pub fn set_label(&mut self, label: &str) {
        self.properties.set_label(label);
    }

    pub fn set_placeholder(&mut self, placeholder: &str) {
        self.properties.set_placeholder(placeholder);
    }

    pub fn set_required(&mut self, required: bool) {
        self.properties.set_required(required);
    }

    /// `""` clears the rule. Unknown names are ignored.
    pub fn set_validation_rule(&mut self, rule: &str) -> bool {
        if rule.is_empty() {
            self.properties.set_validation_rule(None);
            return true;
        }
        match rule.parse::<ValidationRule>() {
            Ok(rule) => {
                self.properties.set_validation_rule(Some(rule));
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn update_option(&mut self, index: usize, value: &str) {
        self.properties.update_option(index, value);
    }

    pub fn add_option(&mut self) {
        self.properties.add_option();
    }

    pub fn remove_option(&mut self, index: usize) {
        self.properties.remove_option(index);
    }

    /// Write the draft back. Returns true if the field changed.
    pub fn save_properties(&mut self) -> bool {
        match self.properties.save(&mut self.canvas) {
            Ok(changed) => changed,
            Err(e) => {
                log::error!("properties save failed: {e}");
                false
            }
        }
    }

    pub fn cancel_properties(&mut self) {
        self.properties.cancel();
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns `{"changed":bool,"action":"<name>"}`.
    /// `saveForm` is only reported; the page performs the request.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = self.dispatch_action(action);
        json!({ "changed": changed, "action": action.name() }).to_string()
    }
}

impl FormCanvas {
    fn dispatch_action(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::DeleteField => match self.properties.selected() {
                Some(id) => self.remove_field(id.get() as f64),
                None => false,
            },
            ShortcutAction::MoveUp => self.nudge_selected(-1),
            ShortcutAction::MoveDown => self.nudge_selected(1),
            ShortcutAction::SaveProperties => self.save_properties(),
            ShortcutAction::TogglePreview => {
                let preview = !self.canvas.is_preview();
                self.set_preview(preview);
                true
            }
            ShortcutAction::SaveForm => false,
            ShortcutAction::Escape => {
                if self.canvas.drag().is_some() {
                    self.canvas.cancel_drag();
                } else {
                    self.properties.cancel();
                }
                false
            }
        }
    }

    fn nudge_selected(&mut self, delta: isize) -> bool {
        let Some(from) = self
            .properties
            .selected()
            .and_then(|id| self.canvas.fields().index_of(id))
        else {
            return false;
        };
        let Some(to) = from.checked_add_signed(delta) else {
            return false;
        };
        self.canvas.move_field(from, to).unwrap_or(false)
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// The palette as `[{"type","label"}]`, in display order.
#[wasm_bindgen]
pub fn palette_json() -> String {
    serde_json::to_string(&PALETTE).unwrap_or_else(|_| "[]".to_string())
}

/// Validation rules as `[{"value","label"}]` for the rule picker.
#[wasm_bindgen]
pub fn validation_rules_json() -> String {
    let rules: Vec<Value> = ValidationRule::ALL
        .into_iter()
        .map(|r| json!({ "value": r.as_str(), "label": r.label() }))
        .collect();
    Value::Array(rules).to_string()
}

/// Check a field sequence without loading it.
/// Returns `{"ok":true,"count":n}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_fields(json: &str) -> String {
    match decode_fields(json) {
        Ok(fields) => ok(json!({ "count": fields.len() })),
        Err(e) => fail(e),
    }
}

/// Session restored from `sessionStorage`:
/// `{"authenticated":bool,"token":...,"user":...}`.
#[wasm_bindgen]
pub fn restore_session() -> String {
    let session = Session::restore(BrowserSessionStore::new());
    json!({
        "authenticated": session.is_authenticated(),
        "token": session.token(),
        "user": session.user(),
    })
    .to_string()
}

/// Persist a signed-in session. `user_json` is the backend's user record.
#[wasm_bindgen]
pub fn begin_session(token: &str, user_json: &str) -> String {
    match serde_json::from_str(user_json) {
        Ok(user) => {
            Session::new(BrowserSessionStore::new()).begin(token, user);
            ok(json!({}))
        }
        Err(e) => fail(e),
    }
}

/// Forced logout: wipe token and user from `sessionStorage`.
#[wasm_bindgen]
pub fn clear_session() {
    Session::restore(BrowserSessionStore::new()).clear();
}

/// Which screen a navigation to `requested` (`builder`, `login`,
/// `register`) lands on.
#[wasm_bindgen]
pub fn resolve_route(requested: &str) -> String {
    let requested = match requested {
        "login" => Route::Login,
        "register" => Route::Register,
        _ => Route::Builder,
    };
    let session = Session::restore(BrowserSessionStore::new());
    match Gate::resolve(&session, requested) {
        Route::Builder => "builder",
        Route::Login => "login",
        Route::Register => "register",
    }
    .to_string()
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn ok(extra: Value) -> String {
    let mut body = json!({ "ok": true });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    body.to_string()
}

fn fail(error: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": error.to_string() }).to_string()
}

/// JS numbers carry field ids; anything negative or fractional is no id.
fn field_id(raw: f64) -> Option<FieldId> {
    (raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0).then(|| FieldId::new(raw as u64))
}

/// Without a system clock the id counter starts from `Date.now()`.
fn seed_field_ids() {
    #[cfg(target_arch = "wasm32")]
    FieldId::observe(FieldId::new(js_sys::Date::now() as u64));
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FB WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

//! Properties editor: edits one selected field through a local draft.
//!
//! Selecting a field copies its configuration into a [`Draft`]. Edits touch
//! only the draft; nothing reaches the canvas until [`PropertiesEditor::save`]
//! writes the whole draft back over the field. [`PropertiesEditor::cancel`]
//! throws the draft away. With nothing selected the editor is idle.

use crate::canvas::Canvas;
use fb_core::{Field, FieldId, FieldKind, FieldShape, Options, SequenceError, ValidationRule};

/// Unsaved copy of one field's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub target: FieldId,
    pub kind: FieldKind,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    pub validation_rule: Option<ValidationRule>,
    pub options: Vec<String>,
}

impl Draft {
    fn of(field: &Field) -> Self {
        Self {
            target: field.id,
            kind: field.kind(),
            label: field.label.clone(),
            placeholder: field.placeholder().unwrap_or_default().to_string(),
            required: field.required,
            validation_rule: field.validation_rule,
            options: field.options().map(<[String]>::to_vec).unwrap_or_default(),
        }
    }

    /// Merge the draft over `field`. Kind, id and uninterpreted keys stay.
    fn apply_to(&self, field: &Field) -> Field {
        let mut next = field.clone();
        next.label = self.label.clone();
        next.required = self.required;
        next.validation_rule = self.validation_rule;
        let placeholder = self.placeholder.clone();
        let options: Options = self.options.iter().cloned().collect();
        next.shape = match &field.shape {
            FieldShape::Text { .. } => FieldShape::Text { placeholder },
            FieldShape::Textarea { .. } => FieldShape::Textarea { placeholder },
            FieldShape::Checkbox => FieldShape::Checkbox,
            FieldShape::Radio { .. } => FieldShape::Radio { options },
            FieldShape::Select { .. } => FieldShape::Select {
                placeholder,
                options,
            },
            FieldShape::Date { .. } => FieldShape::Date { placeholder },
            FieldShape::Button { full_width } => FieldShape::Button {
                full_width: *full_width,
            },
        };
        next
    }
}

#[derive(Debug, Default)]
pub struct PropertiesEditor {
    draft: Option<Draft>,
}

impl PropertiesEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a draft of `field`, replacing any unsaved draft.
    pub fn select(&mut self, field: &Field) {
        log::debug!("properties: editing {} field {}", field.kind(), field.id);
        self.draft = Some(Draft::of(field));
    }

    /// Select the field with `id` on `canvas`. Returns `false` (and goes
    /// idle) if there is no such field.
    pub fn select_id(&mut self, canvas: &Canvas, id: FieldId) -> bool {
        match canvas.fields().get_by_id(id) {
            Some(field) => {
                self.select(field);
                true
            }
            None => {
                self.draft = None;
                false
            }
        }
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.draft.as_ref().map(|d| d.target)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.draft.is_none()
    }

    /// Only choice fields get an options editor.
    pub fn shows_options_editor(&self) -> bool {
        self.draft.as_ref().is_some_and(|d| d.kind.has_options())
    }

    /// Checkbox, radio and button fields have no placeholder to edit.
    pub fn shows_placeholder_editor(&self) -> bool {
        self.draft.as_ref().is_some_and(|d| d.kind.has_placeholder())
    }

    // ─── Draft edits ─────────────────────────────────────────────────────

    pub fn set_label(&mut self, label: impl Into<String>) {
        if let Some(d) = &mut self.draft {
            d.label = label.into();
        }
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        if let Some(d) = &mut self.draft {
            d.placeholder = placeholder.into();
        }
    }

    pub fn set_required(&mut self, required: bool) {
        if let Some(d) = &mut self.draft {
            d.required = required;
        }
    }

    pub fn set_validation_rule(&mut self, rule: Option<ValidationRule>) {
        if let Some(d) = &mut self.draft {
            d.validation_rule = rule;
        }
    }

    /// Overwrite option `index`. Out-of-range indexes are ignored.
    pub fn update_option(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.draft.as_mut().and_then(|d| d.options.get_mut(index)) {
            *slot = value.into();
        }
    }

    /// Append `Option N`, where N is the new option count.
    pub fn add_option(&mut self) {
        if let Some(d) = &mut self.draft {
            let n = d.options.len() + 1;
            d.options.push(format!("Option {n}"));
        }
    }

    /// Drop option `index`. Out-of-range indexes are ignored.
    pub fn remove_option(&mut self, index: usize) {
        if let Some(d) = &mut self.draft
            && index < d.options.len()
        {
            d.options.remove(index);
        }
    }

    // ─── Commit ──────────────────────────────────────────────────────────

    /// Write the draft back over its field and go idle. Returns `Ok(true)`
    /// if the field changed. If the field was deleted meanwhile, the draft
    /// is dropped and nothing changes. During a drag the draft is kept and
    /// nothing is written.
    pub fn save(&mut self, canvas: &mut Canvas) -> Result<bool, SequenceError> {
        let Some(draft) = self.draft.as_ref() else {
            return Ok(false);
        };
        if canvas.drag().is_some() {
            log::debug!("properties: save deferred until the drag ends");
            return Ok(false);
        }
        let Some(existing) = canvas.fields().get_by_id(draft.target) else {
            log::debug!("properties: field {} is gone, draft dropped", draft.target);
            self.draft = None;
            return Ok(false);
        };
        let updated = draft.apply_to(existing);
        let changed = canvas.replace_field(updated)?;
        self.draft = None;
        Ok(changed)
    }

    /// Discard the draft and go idle.
    pub fn cancel(&mut self) {
        self.draft = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas_with(kind: FieldKind) -> (Canvas, FieldId) {
        let mut canvas = Canvas::new();
        let id = canvas.add_field(kind).unwrap();
        (canvas, id)
    }

    #[test]
    fn idle_editor_does_nothing() {
        let (mut canvas, _) = canvas_with(FieldKind::Text);
        let mut editor = PropertiesEditor::new();
        editor.set_label("ignored");
        editor.add_option();
        assert!(editor.is_idle());
        assert_eq!(editor.save(&mut canvas), Ok(false));
    }

    #[test]
    fn draft_edits_do_not_touch_canvas_until_save() {
        let (mut canvas, id) = canvas_with(FieldKind::Text);
        let mut editor = PropertiesEditor::new();
        assert!(editor.select_id(&canvas, id));
        editor.set_label("Full name");
        editor.set_required(true);
        editor.set_validation_rule(Some(ValidationRule::Custom));
        assert_eq!(canvas.fields().get(0).unwrap().label, "New text");

        assert_eq!(editor.save(&mut canvas), Ok(true));
        let field = canvas.fields().get(0).unwrap();
        assert_eq!(field.label, "Full name");
        assert!(field.required);
        assert_eq!(field.validation_rule, Some(ValidationRule::Custom));
        assert_eq!(field.placeholder(), Some("Enter text..."));
        assert!(editor.is_idle());
    }

    #[test]
    fn option_editing() {
        let (mut canvas, id) = canvas_with(FieldKind::Radio);
        let mut editor = PropertiesEditor::new();
        editor.select_id(&canvas, id);
        assert!(editor.shows_options_editor());
        assert!(!editor.shows_placeholder_editor());

        editor.add_option();
        editor.update_option(0, "Yes");
        editor.remove_option(1);
        editor.update_option(10, "nowhere");
        editor.remove_option(10);
        assert_eq!(
            editor.draft().unwrap().options,
            vec!["Yes".to_string(), "Option 3".to_string()]
        );

        editor.save(&mut canvas).unwrap();
        assert_eq!(
            canvas.fields().get(0).unwrap().options(),
            Some(&["Yes".to_string(), "Option 3".to_string()][..])
        );
    }

    #[test]
    fn cancel_discards_draft() {
        let (mut canvas, id) = canvas_with(FieldKind::Select);
        let mut editor = PropertiesEditor::new();
        editor.select_id(&canvas, id);
        editor.set_label("Country");
        editor.cancel();
        assert!(editor.is_idle());
        assert_eq!(editor.save(&mut canvas), Ok(false));
        assert_eq!(canvas.fields().get(0).unwrap().label, "New select");
    }

    #[test]
    fn editor_visibility_by_kind() {
        let mut editor = PropertiesEditor::new();
        for kind in FieldKind::ALL {
            editor.select(&Field::new(FieldId::new(1), kind));
            assert_eq!(
                editor.shows_options_editor(),
                matches!(kind, FieldKind::Radio | FieldKind::Select)
            );
            if matches!(kind, FieldKind::Checkbox | FieldKind::Button) {
                assert!(!editor.shows_placeholder_editor());
            }
        }
    }

    #[test]
    fn save_keeps_kind_payload_and_extra_keys() {
        let (mut canvas, id) = canvas_with(FieldKind::Button);
        let mut field = canvas.fields().get(0).unwrap().clone();
        field
            .extra
            .insert("variant".into(), serde_json::json!("filled"));
        canvas.replace_field(field).unwrap();

        let mut editor = PropertiesEditor::new();
        editor.select_id(&canvas, id);
        editor.set_label("Send");
        editor.set_placeholder("ignored for buttons");
        editor.save(&mut canvas).unwrap();

        let saved = canvas.fields().get(0).unwrap();
        assert_eq!(saved.label, "Send");
        assert_eq!(saved.full_width(), Some(true));
        assert_eq!(saved.placeholder(), None);
        assert_eq!(saved.extra.get("variant"), Some(&serde_json::json!("filled")));
    }

    #[test]
    fn save_after_field_deleted_is_no_op() {
        let (mut canvas, id) = canvas_with(FieldKind::Date);
        let mut editor = PropertiesEditor::new();
        editor.select_id(&canvas, id);
        canvas.remove_field(id);
        assert_eq!(editor.save(&mut canvas), Ok(false));
        assert!(editor.is_idle());
        assert!(canvas.fields().is_empty());
    }

    #[test]
    fn save_during_drag_keeps_draft() {
        let (mut canvas, id) = canvas_with(FieldKind::Text);
        canvas.add_field(FieldKind::Date);
        let mut editor = PropertiesEditor::new();
        editor.select_id(&canvas, id);
        editor.set_label("Full name");

        canvas.begin_field_drag(1);
        assert_eq!(editor.save(&mut canvas), Ok(false));
        assert!(!editor.is_idle());

        canvas.cancel_drag();
        assert_eq!(editor.save(&mut canvas), Ok(true));
        assert_eq!(canvas.fields().get_by_id(id).unwrap().label, "Full name");
    }
}

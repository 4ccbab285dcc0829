//! The canvas: the field sequence of the form being edited plus the drag
//! session currently in flight.
//!
//! Two kinds of drag reach the canvas:
//!
//! - **Palette drag** carries a field kind. Dropping it on the canvas
//!   appends a new default field of that kind.
//! - **Field drag** carries the index of the dragged field. Hovering over
//!   another field's position reorders immediately (live, not on drop) and
//!   the carried index follows the field, so the list already matches the
//!   pointer when the gesture ends. The whole gesture is one undo step.
//!
//! While the canvas is in preview mode every mutation is refused.

use crate::commands::CommandStack;
use fb_core::{CanvasAction, Field, FieldId, FieldKind, FieldSequence, SequenceError};

const HISTORY_DEPTH: usize = 200;

/// Payload carried by the drag session in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    /// An item dragged out of the palette.
    Palette(FieldKind),
    /// A field on the canvas, identified by its current index.
    Field { index: usize },
}

pub struct Canvas {
    fields: FieldSequence,
    history: CommandStack,
    drag: Option<DragPayload>,
    preview: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_fields(FieldSequence::new())
    }

    pub fn with_fields(fields: FieldSequence) -> Self {
        Self {
            fields,
            history: CommandStack::new(HISTORY_DEPTH),
            drag: None,
            preview: false,
        }
    }

    pub fn fields(&self) -> &FieldSequence {
        &self.fields
    }

    /// Replace the whole sequence (another form was opened). History and
    /// any drag in flight are dropped.
    pub fn load(&mut self, fields: FieldSequence) {
        log::debug!("canvas: loaded {} fields", fields.len());
        self.fields = fields;
        self.history.clear();
        self.drag = None;
    }

    pub fn clear(&mut self) {
        self.load(FieldSequence::new());
    }

    // ─── Preview ─────────────────────────────────────────────────────────

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// Toggle preview mode. Entering preview cancels a drag in flight.
    pub fn set_preview(&mut self, preview: bool) {
        if preview {
            self.cancel_drag();
        }
        self.preview = preview;
    }

    fn refuse_in_preview(&self, what: &str) -> bool {
        if self.preview {
            log::warn!("canvas: {what} refused in preview mode");
        }
        self.preview
    }

    /// Direct mutations wait for the drag in flight to end, so they neither
    /// join its undo step nor shift the index it carries.
    fn refuse_mutation(&self, what: &str) -> bool {
        if self.drag.is_some() {
            log::warn!("canvas: {what} refused during a drag");
            return true;
        }
        self.refuse_in_preview(what)
    }

    // ─── Direct mutations ────────────────────────────────────────────────

    /// Append a default field of `kind` with a fresh id.
    /// Returns the new id, or `None` in preview mode or during a drag.
    pub fn add_field(&mut self, kind: FieldKind) -> Option<FieldId> {
        if self.refuse_mutation("add") {
            return None;
        }
        let id = FieldId::fresh();
        match self.execute(CanvasAction::AddField { kind, id }, "Add field") {
            Ok(_) => {
                log::debug!("canvas: added {kind} field {id}");
                Some(id)
            }
            Err(e) => {
                // Fresh ids never collide with ids already in a sequence.
                log::error!("canvas: add {kind} failed: {e}");
                None
            }
        }
    }

    /// Move the field at `from` to `to`. Both must be valid indexes.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<bool, SequenceError> {
        if self.refuse_mutation("move") {
            return Ok(false);
        }
        self.execute(CanvasAction::MoveField { from, to }, "Move field")
    }

    /// Delete the field with `id`. Absent ids are a no-op.
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        if self.refuse_mutation("remove") {
            return false;
        }
        // RemoveField never fails.
        let removed = self
            .execute(CanvasAction::RemoveField { id }, "Delete field")
            .unwrap_or(false);
        if removed {
            log::debug!("canvas: removed field {id}");
        }
        removed
    }

    /// Write back an edited field (matched by id).
    pub fn replace_field(&mut self, field: Field) -> Result<bool, SequenceError> {
        if self.refuse_mutation("edit") {
            return Ok(false);
        }
        self.execute(
            CanvasAction::ReplaceField {
                field: Box::new(field),
            },
            "Edit properties",
        )
    }

    fn execute(&mut self, action: CanvasAction, description: &str) -> Result<bool, SequenceError> {
        self.history.execute(&mut self.fields, action, description)
    }

    // ─── Drag sessions ───────────────────────────────────────────────────

    pub fn drag(&self) -> Option<DragPayload> {
        self.drag
    }

    /// Start dragging the field at `index`. Returns `false` if the index
    /// is out of range, another drag is in flight, or in preview mode.
    pub fn begin_field_drag(&mut self, index: usize) -> bool {
        if self.refuse_in_preview("drag") || self.drag.is_some() || index >= self.fields.len() {
            return false;
        }
        self.history.begin_batch(&self.fields);
        self.drag = Some(DragPayload::Field { index });
        log::debug!("canvas: field drag from {index}");
        true
    }

    /// Start dragging a new field of `kind` out of the palette.
    pub fn begin_palette_drag(&mut self, kind: FieldKind) -> bool {
        if self.refuse_in_preview("drag") || self.drag.is_some() {
            return false;
        }
        self.drag = Some(DragPayload::Palette(kind));
        log::debug!("canvas: palette drag of {kind}");
        true
    }

    /// The pointer is over the field at `index`. A field drag whose carried
    /// index differs reorders right away and then carries `index`.
    /// Returns `true` if the sequence changed.
    pub fn hover(&mut self, index: usize) -> bool {
        let Some(DragPayload::Field { index: carried }) = self.drag else {
            return false;
        };
        if carried == index {
            return false;
        }
        match self.execute(
            CanvasAction::MoveField {
                from: carried,
                to: index,
            },
            "Reorder",
        ) {
            Ok(changed) => {
                self.drag = Some(DragPayload::Field { index });
                changed
            }
            Err(e) => {
                log::debug!("canvas: hover ignored: {e}");
                false
            }
        }
    }

    /// The drag was released over the canvas. A palette drag adds its
    /// field and returns the new id; a field drag just ends.
    pub fn drop_on_canvas(&mut self) -> Option<FieldId> {
        match self.drag.take()? {
            DragPayload::Palette(kind) => self.add_field(kind),
            DragPayload::Field { index } => {
                self.history.end_batch(&self.fields, "Reorder fields");
                log::debug!("canvas: field drag ended at {index}");
                None
            }
        }
    }

    /// The drag ended anywhere else. Reorders already applied by hovering
    /// stay applied (and undoable as one step).
    pub fn cancel_drag(&mut self) {
        if let Some(DragPayload::Field { .. }) = self.drag.take() {
            self.history.end_batch(&self.fields, "Reorder fields");
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Option<String> {
        if self.drag.is_some() || self.refuse_in_preview("undo") {
            return None;
        }
        self.history.undo(&mut self.fields)
    }

    pub fn redo(&mut self) -> Option<String> {
        if self.drag.is_some() || self.refuse_in_preview("redo") {
            return None;
        }
        self.history.redo(&mut self.fields)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

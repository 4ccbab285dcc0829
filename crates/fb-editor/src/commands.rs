//! Undo/Redo command stack.
//!
//! Every canvas mutation is wrapped in a reversible `Command` that can be
//! undone. Commands are pushed to a stack; undo pops and applies the inverse.
//!
//! Drag gestures use **snapshot batching**: the whole field sequence is
//! captured at the start and end of the gesture, so undo/redo replaces the
//! sequence in a single step (no per-hover inverse chain).

use fb_core::{CanvasAction, FieldSequence, SequenceError};

/// A command that captures both a forward action and its inverse.
/// May hold a single action or a snapshot pair (from drag gestures).
#[derive(Debug, Clone)]
pub enum Command {
    /// Single action with its inverse (for non-batch operations).
    Single {
        forward: Box<CanvasAction>,
        inverse: Box<CanvasAction>,
        description: String,
    },
    /// Snapshot-based batch: the sequence before and after a gesture.
    Snapshot {
        before: FieldSequence,
        after: FieldSequence,
        description: String,
    },
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Sequence captured at the start of a batch.
    batch_snapshot: Option<FieldSequence>,
    /// Whether any actions changed the sequence during the current batch.
    batch_dirty: bool,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch group. All actions until `end_batch()` are applied
    /// live but tracked as one atomic undo step.
    pub fn begin_batch(&mut self, fields: &FieldSequence) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(fields.clone());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes, if the sequence
    /// actually changed, push one snapshot command to the undo stack.
    pub fn end_batch(&mut self, fields: &FieldSequence, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let before = self.batch_snapshot.take();
            if self.batch_dirty
                && let Some(before) = before
                && before != *fields
            {
                self.push(Command::Snapshot {
                    before,
                    after: fields.clone(),
                    description: description.to_string(),
                });
            }
            self.batch_dirty = false;
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply an action and record it. Actions that leave the sequence
    /// unchanged are not recorded.
    pub fn execute(
        &mut self,
        fields: &mut FieldSequence,
        action: CanvasAction,
        description: &str,
    ) -> Result<bool, SequenceError> {
        if self.batch_depth > 0 {
            // Inside a batch: apply live, the closing snapshot captures
            // the cumulative effect.
            let changed = fields.apply(action)?;
            self.batch_dirty |= changed;
            return Ok(changed);
        }

        let inverse = compute_inverse(fields, &action);
        let changed = fields.apply(action.clone())?;
        if changed {
            self.push(Command::Single {
                forward: Box::new(action),
                inverse: Box::new(inverse),
                description: description.to_string(),
            });
        }
        Ok(changed)
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the last command (or batch snapshot).
    pub fn undo(&mut self, fields: &mut FieldSequence) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                inverse,
                description,
                ..
            } => {
                if let Err(e) = fields.apply(*inverse.clone()) {
                    log::warn!("undo of `{description}` failed: {e}");
                }
                description.clone()
            }
            Command::Snapshot {
                before,
                description,
                ..
            } => {
                *fields = before.clone();
                description.clone()
            }
        };
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command (or batch snapshot).
    pub fn redo(&mut self, fields: &mut FieldSequence) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                forward,
                description,
                ..
            } => {
                if let Err(e) = fields.apply(*forward.clone()) {
                    log::warn!("redo of `{description}` failed: {e}");
                }
                description.clone()
            }
            Command::Snapshot {
                after, description, ..
            } => {
                *fields = after.clone();
                description.clone()
            }
        };
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all history, e.g. when another form is loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }
}

/// Compute the inverse action needed to undo `action` on `fields`.
fn compute_inverse(fields: &FieldSequence, action: &CanvasAction) -> CanvasAction {
    match action {
        CanvasAction::AddField { id, .. } => CanvasAction::RemoveField { id: *id },
        CanvasAction::MoveField { from, to } => CanvasAction::MoveField {
            from: *to,
            to: *from,
        },
        CanvasAction::RemoveField { id } => {
            // Capture the field and its position before removal
            match fields.index_of(*id) {
                Some(index) => CanvasAction::InsertField {
                    index,
                    field: Box::new(fields.as_slice()[index].clone()),
                },
                None => CanvasAction::RemoveField { id: *id },
            }
        }
        CanvasAction::ReplaceField { field } => match fields.get_by_id(field.id) {
            Some(old) => CanvasAction::ReplaceField {
                field: Box::new(old.clone()),
            },
            None => CanvasAction::ReplaceField {
                field: field.clone(),
            },
        },
        CanvasAction::InsertField { field, .. } => CanvasAction::RemoveField { id: field.id },
    }
}

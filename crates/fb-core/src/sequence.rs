//! The ordered field sequence of one form and its mutation protocol.
//!
//! Every change to a sequence goes through a [`CanvasAction`]. Actions are
//! applied in place with [`FieldSequence::apply`], or functionally with
//! [`reduce`], which leaves the input untouched and returns the next
//! sequence. Invariant: no two fields in a sequence share an id.

use crate::id::FieldId;
use crate::model::{Field, FieldKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// A mutation of a field sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Append a default field of `kind` with the given id.
    AddField { kind: FieldKind, id: FieldId },
    /// Remove the field at `from` and reinsert it at `to`.
    MoveField { from: usize, to: usize },
    /// Delete the field with `id`. Absent ids are ignored.
    RemoveField { id: FieldId },
    /// Replace the field with the same id. Absent ids are ignored.
    ReplaceField { field: Box<Field> },
    /// Put `field` back at `index` (`index <= len`). Restores a removal.
    InsertField { index: usize, field: Box<Field> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("field id {0} already exists in the sequence")]
    DuplicateId(FieldId),
    #[error("index {index} out of range for a sequence of {len} fields")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("field {id} is a {existing} and cannot become a {requested}")]
    KindChange {
        id: FieldId,
        existing: FieldKind,
        requested: FieldKind,
    },
}

/// Ordered fields of one form. Order is rendering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSequence {
    fields: Vec<Field>,
}

impl FieldSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence, rejecting duplicate ids. Every id is recorded so
    /// that freshly generated ids cannot collide with it.
    pub fn from_fields(fields: Vec<Field>) -> Result<Self, SequenceError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.id) {
                return Err(SequenceError::DuplicateId(field.id));
            }
            FieldId::observe(field.id);
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn get_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn index_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn ids(&self) -> Vec<FieldId> {
        self.fields.iter().map(|f| f.id).collect()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Apply `action` in place. Returns `Ok(true)` if the sequence changed.
    /// On error the sequence is left as it was.
    pub fn apply(&mut self, action: CanvasAction) -> Result<bool, SequenceError> {
        match action {
            CanvasAction::AddField { kind, id } => {
                if self.contains(id) {
                    return Err(SequenceError::DuplicateId(id));
                }
                FieldId::observe(id);
                self.fields.push(Field::new(id, kind));
                Ok(true)
            }
            CanvasAction::MoveField { from, to } => {
                let len = self.fields.len();
                for index in [from, to] {
                    if index >= len {
                        return Err(SequenceError::IndexOutOfRange { index, len });
                    }
                }
                if from == to {
                    return Ok(false);
                }
                let moved = self.fields.remove(from);
                self.fields.insert(to, moved);
                Ok(true)
            }
            CanvasAction::RemoveField { id } => match self.index_of(id) {
                Some(index) => {
                    self.fields.remove(index);
                    Ok(true)
                }
                None => Ok(false),
            },
            CanvasAction::ReplaceField { field } => {
                let Some(index) = self.index_of(field.id) else {
                    return Ok(false);
                };
                let existing = self.fields[index].kind();
                if existing != field.kind() {
                    return Err(SequenceError::KindChange {
                        id: field.id,
                        existing,
                        requested: field.kind(),
                    });
                }
                if self.fields[index] == *field {
                    return Ok(false);
                }
                self.fields[index] = *field;
                Ok(true)
            }
            CanvasAction::InsertField { index, field } => {
                let len = self.fields.len();
                if index > len {
                    return Err(SequenceError::IndexOutOfRange { index, len });
                }
                if self.contains(field.id) {
                    return Err(SequenceError::DuplicateId(field.id));
                }
                FieldId::observe(field.id);
                self.fields.insert(index, *field);
                Ok(true)
            }
        }
    }
}

/// Pure state transition: `(sequence, action) -> sequence`.
pub fn reduce(
    sequence: &FieldSequence,
    action: &CanvasAction,
) -> Result<FieldSequence, SequenceError> {
    let mut next = sequence.clone();
    next.apply(action.clone())?;
    Ok(next)
}

impl<'a> IntoIterator for &'a FieldSequence {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl TryFrom<Vec<Field>> for FieldSequence {
    type Error = SequenceError;

    fn try_from(fields: Vec<Field>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl Serialize for FieldSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<Field>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

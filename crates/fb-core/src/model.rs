//! Field data model for FB documents.
//!
//! A form is an ordered sequence of fields. Every field shares a common base
//! (id, label, required flag, advisory validation rule) and carries a
//! kind-specific payload in [`FieldShape`]. The kind of a field is derived
//! from its shape, so the two can never disagree, and a field's kind never
//! changes after creation.

use crate::id::FieldId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::str::FromStr;

/// Choice list of a radio group or select dropdown. Almost always short.
pub type Options = SmallVec<[String; 4]>;

// ─── Field kinds ─────────────────────────────────────────────────────────

/// The closed set of field kinds the builder knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Checkbox,
    Radio,
    Select,
    Date,
    Button,
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Checkbox,
        FieldKind::Radio,
        FieldKind::Select,
        FieldKind::Date,
        FieldKind::Button,
    ];

    /// Wire name (`"text"`, `"textarea"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::Date => "date",
            FieldKind::Button => "button",
        }
    }

    /// Whether fields of this kind carry a placeholder.
    pub const fn has_placeholder(self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Textarea | FieldKind::Select | FieldKind::Date
        )
    }

    /// Whether fields of this kind carry an option list.
    pub const fn has_options(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Select)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type {0:?}")]
pub struct UnknownFieldKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownFieldKind(s.to_string()))
    }
}

// ─── Validation rules ────────────────────────────────────────────────────

/// Advisory validation tag. Stored with the field, never enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationRule {
    None,
    Email,
    Numeric,
    Custom,
}

impl ValidationRule {
    pub const ALL: [ValidationRule; 4] = [
        ValidationRule::None,
        ValidationRule::Email,
        ValidationRule::Numeric,
        ValidationRule::Custom,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ValidationRule::None => "none",
            ValidationRule::Email => "email",
            ValidationRule::Numeric => "numeric",
            ValidationRule::Custom => "custom",
        }
    }

    /// Human label shown in the rule picker.
    pub const fn label(self) -> &'static str {
        match self {
            ValidationRule::None => "None",
            ValidationRule::Email => "Email Format",
            ValidationRule::Numeric => "Only Numbers",
            ValidationRule::Custom => "Custom Regex",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation rule {0:?}")]
pub struct UnknownValidationRule(pub String);

impl FromStr for ValidationRule {
    type Err = UnknownValidationRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationRule::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownValidationRule(s.to_string()))
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Kind-specific payload of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    Text { placeholder: String },
    Textarea { placeholder: String },
    Checkbox,
    Radio { options: Options },
    Select { placeholder: String, options: Options },
    Date { placeholder: String },
    Button { full_width: bool },
}

impl FieldShape {
    /// Default payload for a freshly dropped field of `kind`.
    pub fn default_for(kind: FieldKind) -> Self {
        let placeholder = format!("Enter {kind}...");
        match kind {
            FieldKind::Text => FieldShape::Text { placeholder },
            FieldKind::Textarea => FieldShape::Textarea { placeholder },
            FieldKind::Checkbox => FieldShape::Checkbox,
            FieldKind::Radio => FieldShape::Radio {
                options: default_options(),
            },
            FieldKind::Select => FieldShape::Select {
                placeholder,
                options: default_options(),
            },
            FieldKind::Date => FieldShape::Date { placeholder },
            FieldKind::Button => FieldShape::Button { full_width: true },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldShape::Text { .. } => FieldKind::Text,
            FieldShape::Textarea { .. } => FieldKind::Textarea,
            FieldShape::Checkbox => FieldKind::Checkbox,
            FieldShape::Radio { .. } => FieldKind::Radio,
            FieldShape::Select { .. } => FieldKind::Select,
            FieldShape::Date { .. } => FieldKind::Date,
            FieldShape::Button { .. } => FieldKind::Button,
        }
    }
}

fn default_options() -> Options {
    smallvec!["Option 1".to_string(), "Option 2".to_string()]
}

/// Default label for a freshly dropped field of `kind`.
pub fn default_label(kind: FieldKind) -> String {
    match kind {
        FieldKind::Button => "Submit".to_string(),
        other => format!("New {other}"),
    }
}

// ─── Field ───────────────────────────────────────────────────────────────

/// One configurable element of a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub required: bool,
    pub validation_rule: Option<ValidationRule>,
    pub shape: FieldShape,
    /// Property keys this model does not interpret, kept verbatim.
    pub extra: Map<String, Value>,
}

impl Field {
    /// A field of `kind` with its default properties.
    pub fn new(id: FieldId, kind: FieldKind) -> Self {
        Self {
            id,
            label: default_label(kind),
            required: false,
            validation_rule: None,
            shape: FieldShape::default_for(kind),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.shape.kind()
    }

    pub fn placeholder(&self) -> Option<&str> {
        match &self.shape {
            FieldShape::Text { placeholder }
            | FieldShape::Textarea { placeholder }
            | FieldShape::Select { placeholder, .. }
            | FieldShape::Date { placeholder } => Some(placeholder),
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.shape {
            FieldShape::Radio { options } | FieldShape::Select { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn full_width(&self) -> Option<bool> {
        match self.shape {
            FieldShape::Button { full_width } => Some(full_width),
            _ => None,
        }
    }

    /// Label as rendered on the canvas: required fields get a trailing ` *`.
    pub fn display_label(&self) -> String {
        if self.required && self.kind() != FieldKind::Button {
            format!("{} *", self.label)
        } else {
            self.label.clone()
        }
    }
}

/// Default properties of `kind`, as an open key/value mapping.
pub fn default_properties(kind: FieldKind) -> Map<String, Value> {
    Field::new(FieldId::new(0), kind).properties()
}

//! The palette: the fixed catalog of field kinds that can be dragged onto
//! the canvas.

use crate::model::{FieldKind, default_properties};
use serde::Serialize;
use serde_json::{Map, Value};

/// One draggable entry of the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteItem {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Button caption shown in the sidebar.
    pub label: &'static str,
}

impl PaletteItem {
    /// Properties a field dropped from this item starts with.
    pub fn default_properties(&self) -> Map<String, Value> {
        default_properties(self.kind)
    }
}

/// Palette entries in sidebar order.
pub const PALETTE: [PaletteItem; 7] = [
    PaletteItem {
        kind: FieldKind::Text,
        label: "Text Input",
    },
    PaletteItem {
        kind: FieldKind::Textarea,
        label: "Textarea",
    },
    PaletteItem {
        kind: FieldKind::Checkbox,
        label: "Checkbox",
    },
    PaletteItem {
        kind: FieldKind::Radio,
        label: "Radio Buttons",
    },
    PaletteItem {
        kind: FieldKind::Select,
        label: "Select Dropdown",
    },
    PaletteItem {
        kind: FieldKind::Date,
        label: "Date Picker",
    },
    PaletteItem {
        kind: FieldKind::Button,
        label: "Submit Button",
    },
];

pub fn palette_item(kind: FieldKind) -> &'static PaletteItem {
    // PALETTE lists every kind exactly once, in declaration order.
    &PALETTE[kind as usize]
}

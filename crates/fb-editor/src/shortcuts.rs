//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so every host (browser bridge, native shell) binds the same keys.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    /// Delete the field open in the properties editor.
    DeleteField,
    /// Move the selected field one slot up (keyboard alternative to drag).
    MoveUp,
    MoveDown,
    SaveProperties,

    // ── Form ──
    SaveForm,
    TogglePreview,

    // ── UI ──
    /// Cancel the drag in flight, else close the properties editor.
    Escape,
}

impl ShortcutAction {
    pub const fn name(self) -> &'static str {
        match self {
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
            ShortcutAction::DeleteField => "deleteField",
            ShortcutAction::MoveUp => "moveUp",
            ShortcutAction::MoveDown => "moveDown",
            ShortcutAction::SaveProperties => "saveProperties",
            ShortcutAction::SaveForm => "saveForm",
            ShortcutAction::TogglePreview => "togglePreview",
            ShortcutAction::Escape => "escape",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "p" | "P" => Some(ShortcutAction::TogglePreview),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::SaveForm),
                "Enter" => Some(ShortcutAction::SaveProperties),
                _ => None,
            };
        }

        if alt {
            return match key {
                "ArrowUp" => Some(ShortcutAction::MoveUp),
                "ArrowDown" => Some(ShortcutAction::MoveDown),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            // Backspace stays unbound: it edits text in the properties inputs.
            "Delete" => Some(ShortcutAction::DeleteField),
            "Escape" => Some(ShortcutAction::Escape),
            _ => None,
        }
    }
}

//! Integration tests: canvas editing with undo/redo across crate
//! boundaries (fb-core sequence + fb-editor canvas and properties).

use fb_core::{FieldKind, decode_fields, encode_fields};
use fb_editor::{Canvas, PropertiesEditor};
use pretty_assertions::assert_eq;

fn canvas_of(kinds: &[FieldKind]) -> Canvas {
    let mut canvas = Canvas::new();
    for &kind in kinds {
        canvas.add_field(kind).unwrap();
    }
    canvas
}

#[test]
fn delete_then_undo_restores_position() {
    let mut canvas = canvas_of(&[FieldKind::Text, FieldKind::Select, FieldKind::Button]);
    let before = canvas.fields().clone();
    let middle = before.get(1).unwrap().id;

    assert!(canvas.remove_field(middle));
    assert_eq!(canvas.undo().as_deref(), Some("Delete field"));
    assert_eq!(canvas.fields(), &before);
    assert_eq!(canvas.redo().as_deref(), Some("Delete field"));
    assert!(!canvas.fields().contains(middle));
}

#[test]
fn properties_save_is_one_undo_step() {
    let mut canvas = canvas_of(&[FieldKind::Select]);
    let id = canvas.fields().get(0).unwrap().id;
    let mut editor = PropertiesEditor::new();
    editor.select_id(&canvas, id);
    editor.set_label("Country");
    editor.set_placeholder("Pick one");
    editor.add_option();
    editor.save(&mut canvas).unwrap();

    assert_eq!(canvas.undo().as_deref(), Some("Edit properties"));
    let field = canvas.fields().get(0).unwrap();
    assert_eq!(field.label, "New select");
    assert_eq!(field.options().map(<[String]>::len), Some(2));
}

#[test]
fn reorder_gesture_survives_encoding() {
    let mut canvas = canvas_of(&[FieldKind::Text, FieldKind::Textarea, FieldKind::Checkbox]);
    let ids = canvas.fields().ids();
    canvas.begin_field_drag(0);
    canvas.hover(1);
    canvas.hover(2);
    canvas.drop_on_canvas();

    let text = encode_fields(canvas.fields()).unwrap();
    let decoded = decode_fields(&text).unwrap();
    assert_eq!(decoded.ids(), vec![ids[1], ids[2], ids[0]]);

    // Undo restores the original order in one step.
    canvas.undo();
    assert_eq!(canvas.fields().ids(), ids);
    assert!(canvas.can_redo());
}

#[test]
fn new_action_after_undo_drops_redo() {
    let mut canvas = canvas_of(&[FieldKind::Text, FieldKind::Date]);
    canvas.move_field(0, 1).unwrap();
    canvas.undo();
    assert!(canvas.can_redo());
    canvas.add_field(FieldKind::Radio);
    assert!(!canvas.can_redo());
}

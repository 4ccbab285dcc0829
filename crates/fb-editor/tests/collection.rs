//! Integration tests: the form collection manager against an in-memory
//! backend.

mod common;

use common::{FakeBackend, signed_in};
use fb_core::{ApiError, CanvasAction, FieldId, FieldKind, FieldSequence, FormId};
use fb_editor::collection::*;
use fb_editor::{FormCollection, Level, Session};
use pretty_assertions::assert_eq;

fn fields(kinds: &[(u64, FieldKind)]) -> FieldSequence {
    let mut seq = FieldSequence::new();
    for &(id, kind) in kinds {
        seq.apply(CanvasAction::AddField {
            kind,
            id: FieldId::new(id),
        })
        .unwrap();
    }
    seq
}

fn two_forms() -> FakeBackend {
    FakeBackend::new()
        .with_form("Contact", fields(&[(1, FieldKind::Text), (2, FieldKind::Button)]))
        .with_form("Survey", fields(&[(3, FieldKind::Radio)]))
}

fn last_message<B: fb_core::FormBackend>(collection: &FormCollection<B>) -> (Level, String) {
    let n = collection.notifications().last().unwrap();
    (n.level, n.message.clone())
}

// ─── Load / select ──────────────────────────────────────────────────────

#[tokio::test]
async fn load_opens_first_form() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    assert!(collection.load(&mut session).await);

    assert_eq!(collection.forms().len(), 2);
    assert_eq!(collection.selected(), Some(FormId::new(1)));
    assert_eq!(collection.title(), "Contact");
    assert_eq!(collection.fields().ids(), vec![FieldId::new(1), FieldId::new(2)]);
}

#[tokio::test]
async fn load_of_empty_collection_opens_nothing() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(FakeBackend::new());
    assert!(collection.load(&mut session).await);
    assert_eq!(collection.selected(), None);
    assert!(collection.fields().is_empty());
}

#[tokio::test]
async fn load_failure_notifies() {
    let mut session = signed_in();
    let backend = two_forms();
    backend.fail_next(ApiError::Network("connection refused".into()));
    let mut collection = FormCollection::new(backend);
    assert!(!collection.load(&mut session).await);
    assert_eq!(
        last_message(&collection),
        (Level::Error, MSG_FETCH_FAILED.to_string())
    );
    assert!(collection.forms().is_empty());
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn select_unknown_form_clears_state() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;

    assert!(!collection.select_form(&mut session, FormId::new(99)).await);
    assert_eq!(collection.selected(), None);
    assert!(collection.fields().is_empty());
    assert_eq!(
        last_message(&collection),
        (Level::Error, MSG_NOT_FOUND.to_string())
    );
}

#[tokio::test]
async fn select_replaces_canvas() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;
    collection.canvas_mut().add_field(FieldKind::Date);

    assert!(collection.select_form(&mut session, FormId::new(2)).await);
    assert_eq!(collection.title(), "Survey");
    assert_eq!(collection.fields().ids(), vec![FieldId::new(3)]);
    assert!(!collection.canvas().can_undo());
}

// ─── Save ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_of_empty_form_makes_no_request() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(FakeBackend::new().with_form("Blank", FieldSequence::new()));
    collection.load(&mut session).await;
    let calls_before = collection.backend().calls().len();

    assert!(!collection.save_form(&mut session).await);
    assert_eq!(collection.backend().calls().len(), calls_before);
    assert_eq!(
        last_message(&collection),
        (Level::Warning, MSG_EMPTY_FORM.to_string())
    );
}

#[tokio::test]
async fn save_without_selection_warns() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(FakeBackend::new());
    collection.canvas_mut().add_field(FieldKind::Text);

    assert!(!collection.save_form(&mut session).await);
    assert!(collection.backend().calls().is_empty());
    assert_eq!(
        last_message(&collection),
        (Level::Warning, MSG_NO_SELECTION.to_string())
    );
}

#[tokio::test]
async fn save_sends_title_and_fields() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;
    collection.rename_selected("Contact us");
    collection.canvas_mut().move_field(0, 1).unwrap();

    assert!(collection.save_form(&mut session).await);
    assert_eq!(
        last_message(&collection),
        (Level::Success, MSG_SAVED.to_string())
    );
    // Create-style: the backend stored a new record.
    let saved = collection.backend().stored(FormId::new(3)).unwrap();
    assert_eq!(saved.title, "Contact us");
    assert_eq!(saved.fields.ids(), vec![FieldId::new(2), FieldId::new(1)]);
}

#[tokio::test]
async fn unauthorized_save_clears_session() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;
    collection.backend().fail_next(ApiError::Unauthorized);

    assert!(!collection.save_form(&mut session).await);
    assert!(!session.is_authenticated());
    assert_eq!(
        last_message(&collection),
        (Level::Error, MSG_SAVE_FAILED.to_string())
    );
}

#[tokio::test]
async fn operations_without_session_make_no_request() {
    let mut session = Session::default();
    let mut collection = FormCollection::new(two_forms());
    assert!(!collection.load(&mut session).await);
    assert_eq!(collection.add_form(&mut session).await, None);
    assert!(collection.backend().calls().is_empty());
}

// ─── Add / remove ───────────────────────────────────────────────────────

#[tokio::test]
async fn add_form_opens_new_form_with_text_field() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;

    let id = collection.add_form(&mut session).await.unwrap();
    assert_eq!(collection.selected(), Some(id));
    assert_eq!(collection.title(), "New Form 3");
    assert_eq!(collection.fields().len(), 1);
    assert_eq!(collection.fields().get(0).unwrap().kind(), FieldKind::Text);
    let stored = collection.backend().stored(id).unwrap();
    assert_eq!(stored.fields.ids(), collection.fields().ids());
    assert_eq!(stored.fields.get(0).unwrap().label, "New text");
    assert_eq!(
        last_message(&collection),
        (Level::Success, MSG_ADDED.to_string())
    );
}

#[tokio::test]
async fn add_form_failure_changes_nothing() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;
    collection.backend().fail_next(ApiError::Remote {
        status: 500,
        message: Some("Database unavailable".into()),
    });

    assert_eq!(collection.add_form(&mut session).await, None);
    assert_eq!(collection.forms().len(), 2);
    assert_eq!(collection.selected(), Some(FormId::new(1)));
    assert_eq!(
        last_message(&collection),
        (Level::Error, "Database unavailable".to_string())
    );
}

#[tokio::test]
async fn remove_selects_first_remaining() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;

    assert!(collection.remove_form(&mut session, FormId::new(1)).await);
    assert_eq!(collection.forms().len(), 1);
    assert_eq!(collection.selected(), Some(FormId::new(2)));
    assert_eq!(collection.fields().ids(), vec![FieldId::new(3)]);
    assert_eq!(collection.backend().stored_count(), 1);
}

#[tokio::test]
async fn remove_last_form_closes_everything() {
    let mut session = signed_in();
    let mut collection =
        FormCollection::new(FakeBackend::new().with_form("Only", fields(&[(1, FieldKind::Text)])));
    collection.load(&mut session).await;

    assert!(collection.remove_form(&mut session, FormId::new(1)).await);
    assert_eq!(collection.selected(), None);
    assert!(collection.fields().is_empty());
    assert_eq!(
        last_message(&collection),
        (Level::Success, MSG_REMOVED.to_string())
    );
}

#[tokio::test]
async fn rejected_delete_keeps_local_state() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;
    collection
        .backend()
        .fail_next(ApiError::Rejected("Something else happened".into()));

    assert!(!collection.remove_form(&mut session, FormId::new(1)).await);
    assert_eq!(collection.forms().len(), 2);
    assert_eq!(collection.selected(), Some(FormId::new(1)));
    assert_eq!(collection.notifications().last().unwrap().level, Level::Error);
}

// ─── Properties through the manager ─────────────────────────────────────

#[tokio::test]
async fn edit_field_properties_then_save() {
    let mut session = signed_in();
    let mut collection = FormCollection::new(two_forms());
    collection.load(&mut session).await;

    assert!(collection.select_field(FieldId::new(1)));
    collection.properties_mut().set_label("Email");
    collection.properties_mut().set_required(true);
    assert!(collection.save_properties());
    assert_eq!(collection.fields().get(0).unwrap().display_label(), "Email *");

    assert!(collection.save_form(&mut session).await);
    let saved = collection.backend().stored(FormId::new(3)).unwrap();
    assert_eq!(saved.fields.get(0).unwrap().label, "Email");
}

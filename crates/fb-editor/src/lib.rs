//! Editing engine for the form builder: the canvas with its drag/drop
//! protocol, the properties editor, undo/redo, notifications, the session
//! and the collection manager that talks to the backend.

pub mod auth;
pub mod canvas;
pub mod collection;
pub mod commands;
pub mod notify;
pub mod properties;
pub mod session;
pub mod shortcuts;

pub use auth::{AuthError, CredentialErrors, Gate, Route};
pub use canvas::{Canvas, DragPayload};
pub use collection::FormCollection;
pub use commands::CommandStack;
pub use notify::{Level, Notification, Notifications};
pub use properties::{Draft, PropertiesEditor};
pub use session::{MemoryStore, Session, SessionStore};
pub use shortcuts::{ShortcutAction, ShortcutMap};

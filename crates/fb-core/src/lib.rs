pub mod api;
pub mod id;
pub mod lint;
pub mod model;
pub mod palette;
pub mod sequence;
pub mod wire;

pub use api::{ApiError, Credentials, FormBackend, FormDraft, LoginResponse, Registration, User};
pub use id::{FieldId, FormId};
pub use lint::{LintDiagnostic, LintSeverity, lint_fields};
pub use model::*;
pub use palette::{PALETTE, PaletteItem, palette_item};
pub use sequence::{CanvasAction, FieldSequence, SequenceError, reduce};
pub use wire::{Form, SaveRequest, WireError, decode_fields, encode_fields, forms_from_value};

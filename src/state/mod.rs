pub mod context;
pub mod persistence;

pub use context::EditorContext;
pub use persistence::{
    deserialize, serialize, serialize_to_string, Autosave, PendingSave, PersistenceError,
    PersistenceResult,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

// Single static counter for in-process ids (gesture regions, chain tokens)
static NEXT_LOCAL_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-unique id. Never persisted.
pub fn generate_id() -> usize {
    NEXT_LOCAL_ID.fetch_add(1, Ordering::SeqCst)
}

/// Globally unique id for documents that end up on disk (projects, drawings, panels).
pub fn generate_document_id() -> String {
    Uuid::new_v4().to_string()
}

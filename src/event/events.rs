use std::sync::Arc;

use crate::command::{Applied, CommandKind};
use crate::document::Project;

#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// The history moved to a new current snapshot
    SnapshotSettled {
        snapshot: Arc<Project>,
        applied: Applied,
        cursor: usize,
    },
    /// A command failed and the history was left as it was
    CommandRejected { kind: CommandKind, reason: String },
}

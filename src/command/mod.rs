mod commands;
mod context;
mod history;

use thiserror::Error;

use crate::error::ModelError;
use crate::state::persistence::PersistenceError;

pub use commands::{ChainKey, ChainToken, Command, CommandKind, ImportedPixels};
pub use context::CommandContext;
pub use history::{Applied, CommandHistory, HistoryEntry};

/// Result type for command operations
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Reasons a command could not be applied. The history is left untouched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("could not load document: {0}")]
    Load(#[from] PersistenceError),
}

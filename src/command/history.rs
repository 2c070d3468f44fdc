use std::sync::Arc;

use super::{ChainKey, Command, CommandContext, CommandResult};
use crate::document::Project;
use crate::state::persistence;

/// One settled state of the document and the command that produced it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    snapshot: Arc<Project>,
    command: Command,
    chain: Option<ChainKey>,
}

impl HistoryEntry {
    pub fn snapshot(&self) -> &Arc<Project> {
        &self.snapshot
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn chain(&self) -> Option<ChainKey> {
        self.chain
    }
}

/// How a dispatched command changed the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new entry was appended after the cursor, dropping any redo branch
    Pushed,
    /// The entry under the cursor was replaced by a later edit of the same gesture
    Coalesced,
    Undone,
    Redone,
    /// Nothing changed: a no-op edit, or undo/redo at the end of the log
    Unchanged,
}

impl Applied {
    pub fn changed(self) -> bool {
        self != Applied::Unchanged
    }
}

/// Log of snapshots with a cursor.
///
/// Never empty: the first entry is the project the editor booted with, and
/// `cursor` always points at a valid entry. Entries after the cursor form the
/// redo branch.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl CommandHistory {
    /// Starts a history whose only entry is `project`.
    pub fn new(project: Project) -> Self {
        Self::seeded(project, Command::NewProject)
    }

    /// Starts from the persisted document if it loads, or from a fresh project.
    pub fn boot(persisted: Option<&str>, ctx: &CommandContext) -> Self {
        if let Some(document) = persisted {
            match persistence::deserialize(document.as_bytes()) {
                Ok(project) => {
                    log::info!("Restored project '{}'", project.name());
                    return Self::seeded(
                        project,
                        Command::Load {
                            document: document.to_string(),
                        },
                    );
                }
                Err(err) => log::warn!("Discarding unreadable saved project: {err}"),
            }
        }
        Self::new(Project::with_default_drawing(ctx.viewport_width))
    }

    fn seeded(project: Project, command: Command) -> Self {
        Self {
            entries: vec![HistoryEntry {
                snapshot: Arc::new(project),
                command,
                chain: None,
            }],
            cursor: 0,
        }
    }

    /// Applies `command` to the current snapshot and records the result.
    ///
    /// On error the history is exactly as it was before the call.
    pub fn execute(&mut self, command: Command, ctx: &CommandContext) -> CommandResult<Applied> {
        match command {
            Command::Undo if self.undo() => return Ok(Applied::Undone),
            Command::Redo if self.redo() => return Ok(Applied::Redone),
            Command::Undo | Command::Redo => return Ok(Applied::Unchanged),
            _ => {}
        }

        let Some(snapshot) = command.apply(self.current(), ctx)? else {
            log::debug!("{:?} left the project unchanged", command.kind());
            return Ok(Applied::Unchanged);
        };

        let chain = command.chain_key();
        Ok(self.push_or_coalesce(snapshot, command, chain))
    }

    /// Records `snapshot`, replacing the current entry if it was made by the
    /// same gesture (`chain` equal to the current entry's and not `None`).
    /// Otherwise appends it after the cursor and drops the redo branch.
    pub fn push_or_coalesce(
        &mut self,
        snapshot: Project,
        command: Command,
        chain: Option<ChainKey>,
    ) -> Applied {
        let entry = HistoryEntry {
            snapshot: Arc::new(snapshot),
            command,
            chain,
        };

        let top = &mut self.entries[self.cursor];
        if chain.is_some() && top.chain == chain {
            *top = entry;
            return Applied::Coalesced;
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor += 1;
        Applied::Pushed
    }

    /// Steps the cursor back. Returns `false` at the first entry.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Steps the cursor forward. Returns `false` at the last entry.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn current(&self) -> &Project {
        &self.entries[self.cursor].snapshot
    }

    pub fn current_snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.entries[self.cursor].snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

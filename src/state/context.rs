use std::sync::Arc;

use crate::command::{Applied, Command, CommandContext, CommandHistory, CommandResult};
use crate::document::Project;
use crate::event::{EditorEvent, EventBus, EventHandler};

/// The editor's single entry point for changing the document.
///
/// UI code sends [`Command`]s through [`EditorContext::dispatch`] and reads the
/// result back through [`EditorContext::current_snapshot`]. Observers such as
/// autosave subscribe to the event bus and hear about every settled snapshot.
#[derive(Debug)]
pub struct EditorContext {
    history: CommandHistory,
    command_context: CommandContext,
    event_bus: EventBus,
}

impl EditorContext {
    pub fn new(project: Project) -> Self {
        Self::with_history(CommandHistory::new(project), CommandContext::default())
    }

    /// Restores the persisted document, falling back to a fresh project.
    pub fn boot(persisted: Option<&str>, command_context: CommandContext) -> Self {
        Self::with_history(CommandHistory::boot(persisted, &command_context), command_context)
    }

    fn with_history(history: CommandHistory, command_context: CommandContext) -> Self {
        Self {
            history,
            command_context,
            event_bus: EventBus::new(),
        }
    }

    /// Applies `command` and notifies subscribers.
    ///
    /// A rejected command leaves the history untouched and is also reported on
    /// the bus as [`EditorEvent::CommandRejected`].
    pub fn dispatch(&mut self, command: Command) -> CommandResult<Applied> {
        let kind = command.kind();
        match self.history.execute(command, &self.command_context) {
            Ok(applied) => {
                if applied.changed() {
                    self.event_bus.emit(EditorEvent::SnapshotSettled {
                        snapshot: self.history.current_snapshot(),
                        applied,
                        cursor: self.history.cursor(),
                    });
                }
                Ok(applied)
            }
            Err(err) => {
                log::warn!("{kind:?} rejected: {err}");
                self.event_bus.emit(EditorEvent::CommandRejected {
                    kind,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn current_snapshot(&self) -> Arc<Project> {
        self.history.current_snapshot()
    }

    pub fn project(&self) -> &Project {
        self.history.current()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn command_context(&self) -> CommandContext {
        self.command_context
    }

    pub fn set_viewport_width(&mut self, viewport_width: f32) {
        self.command_context.viewport_width = viewport_width;
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }
}

mod bus;
mod events;

pub use bus::EventBus;
pub use events::EditorEvent;

/// Observer of settled editor state. Runs on the UI thread, after the
/// history has been updated.
pub trait EventHandler {
    fn handle_event(&mut self, event: &EditorEvent);
}

//! Gesture regions that turn pointer input into [`Command`]s.
//!
//! Tools never touch the document. They push commands onto a shared
//! [`CommandQueue`], which the app drains into the editor once input for the
//! frame has been processed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::Command;

mod panel_drag;
mod pencil;
mod resize_handle;

pub use panel_drag::{PanelDrag, PanelDragTool};
pub use pencil::{PencilStroke, PencilTool, PinchZoom};
pub use resize_handle::{Corner, ResizeDrag, ResizeHandleTool};

/// Commands waiting for dispatch, in emission order.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue(Rc<RefCell<Vec<Command>>>);

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: Command) {
        self.0.borrow_mut().push(command);
    }

    /// Takes every queued command, oldest first.
    pub fn drain(&self) -> Vec<Command> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

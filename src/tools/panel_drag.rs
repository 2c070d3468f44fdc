use egui::Pos2;

use super::CommandQueue;
use crate::command::{ChainToken, Command};
use crate::document::{Panel, ZOffset};
use crate::input::{GestureHandler, PointerEvent};

/// Where a panel drag started, threaded through the whole gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelDrag {
    pub chain: ChainToken,
    pub pointer_start: Pos2,
    pub origin: Pos2,
}

/// Moves a panel by its frame. Grabbing a panel raises it to the top.
#[derive(Debug)]
pub struct PanelDragTool {
    queue: CommandQueue,
    panel_id: String,
    origin: Pos2,
}

impl PanelDragTool {
    pub fn new(queue: CommandQueue, panel: &Panel) -> Self {
        Self {
            queue,
            panel_id: panel.id().to_string(),
            origin: panel.position(),
        }
    }

    pub fn sync(&mut self, panel: &Panel) {
        self.panel_id = panel.id().to_string();
        self.origin = panel.position();
    }
}

impl GestureHandler for PanelDragTool {
    type Drag = PanelDrag;
    type Pinch = ();

    fn on_drag_start(&mut self, event: &PointerEvent) -> Option<PanelDrag> {
        self.queue.push(Command::SetPanelZ {
            panel_id: self.panel_id.clone(),
            offset: ZOffset::Front,
        });
        Some(PanelDrag {
            chain: ChainToken::mint(),
            pointer_start: event.pos,
            origin: self.origin,
        })
    }

    fn on_drag_move(
        &mut self,
        event: &PointerEvent,
        start: Option<&PanelDrag>,
        _prev: Option<&PanelDrag>,
    ) -> Option<PanelDrag> {
        let start = start?;
        let target = start.origin + (event.pos - start.pointer_start);
        self.queue.push(Command::MovePanel {
            panel_id: self.panel_id.clone(),
            x: target.x,
            y: target.y,
            chain: Some(start.chain),
        });
        Some(*start)
    }
}

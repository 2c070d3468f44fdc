use egui::{Pos2, Rect};

use super::CommandQueue;
use crate::color::Color;
use crate::command::{ChainToken, Command};
use crate::document::{Drawing, MAX_PIXEL_SIZE, MIN_PIXEL_SIZE};
use crate::geometry::{cell_at, interpolate, Position};
use crate::input::{GestureHandler, PointerEvent};

/// Drag accumulator: the gesture's chain token and the last painted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PencilStroke {
    pub chain: ChainToken,
    pub last: Pos2,
}

/// Pinch accumulator: finger distance and the pixel size it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchZoom {
    pub distance: f32,
    pub pixel_size: u32,
}

/// Paints cells on one drawing's canvas. A `None` color erases.
///
/// Dragging paints every cell the pointer path crosses, as one undo step.
/// Pinching previews a new pixel size and commits it when the pinch ends.
#[derive(Debug)]
pub struct PencilTool {
    queue: CommandQueue,
    drawing_id: String,
    canvas: Rect,
    pixel_size: u32,
    rows: usize,
    columns: usize,
    color: Option<Color>,
    zoom_preview: Option<u32>,
}

impl PencilTool {
    pub fn new(queue: CommandQueue, drawing: &Drawing, canvas: Rect) -> Self {
        let mut tool = Self {
            queue,
            drawing_id: drawing.id().to_string(),
            canvas,
            pixel_size: drawing.pixel_size(),
            rows: 0,
            columns: 0,
            color: Some(Color::BLACK),
            zoom_preview: None,
        };
        tool.sync(drawing, canvas);
        tool
    }

    /// Refreshes the grid geometry from the current snapshot.
    pub fn sync(&mut self, drawing: &Drawing, canvas: Rect) {
        self.drawing_id = drawing.id().to_string();
        self.canvas = canvas;
        self.pixel_size = drawing.pixel_size();
        self.rows = drawing.row_count();
        self.columns = drawing.column_count();
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Pixel size to draw with while a pinch is in progress.
    pub fn zoom_preview(&self) -> Option<u32> {
        self.zoom_preview
    }

    fn cell(&self, screen: Pos2) -> Position {
        cell_at((screen - self.canvas.min).to_pos2(), self.pixel_size as f32)
    }

    fn in_grid(&self, cell: Position) -> bool {
        (0..self.rows as i32).contains(&cell.row) && (0..self.columns as i32).contains(&cell.col)
    }

    fn paint(&self, cell: Position, chain: ChainToken) {
        if !self.in_grid(cell) {
            return;
        }
        self.queue.push(Command::SetPixel {
            drawing_id: self.drawing_id.clone(),
            position: cell,
            color: self.color,
            chain: Some(chain),
        });
    }
}

impl GestureHandler for PencilTool {
    type Drag = PencilStroke;
    type Pinch = PinchZoom;

    fn force_lock_on_pinch(&self) -> bool {
        true
    }

    fn on_drag_start(&mut self, event: &PointerEvent) -> Option<PencilStroke> {
        let chain = ChainToken::mint();
        self.paint(self.cell(event.pos), chain);
        Some(PencilStroke {
            chain,
            last: event.pos,
        })
    }

    fn on_drag_move(
        &mut self,
        event: &PointerEvent,
        start: Option<&PencilStroke>,
        prev: Option<&PencilStroke>,
    ) -> Option<PencilStroke> {
        let stroke = prev.or(start)?;
        // Still on the cell painted last time
        if self.cell(event.pos) == self.cell(stroke.last) {
            return Some(*stroke);
        }
        let origin = self.canvas.min.to_vec2();
        for cell in interpolate(event.pos - origin, stroke.last - origin, self.pixel_size as f32) {
            self.paint(cell, stroke.chain);
        }
        Some(PencilStroke {
            chain: stroke.chain,
            last: event.pos,
        })
    }

    fn on_pinch_start(&mut self, pointers: &[PointerEvent; 2], _trigger: usize) -> Option<PinchZoom> {
        let [a, b] = pointers;
        self.zoom_preview = Some(self.pixel_size);
        Some(PinchZoom {
            distance: a.pos.distance(b.pos),
            pixel_size: self.pixel_size,
        })
    }

    fn on_pinch_move(
        &mut self,
        pointers: &[PointerEvent; 2],
        start: Option<&PinchZoom>,
        _prev: Option<&PinchZoom>,
    ) -> Option<PinchZoom> {
        let start = start?;
        let [a, b] = pointers;
        let distance = a.pos.distance(b.pos);
        if start.distance <= f32::EPSILON {
            return Some(*start);
        }

        let scaled = (start.pixel_size as f32 * distance / start.distance).round();
        let pixel_size = (scaled as u32).clamp(MIN_PIXEL_SIZE, MAX_PIXEL_SIZE);
        self.zoom_preview = Some(pixel_size);
        Some(PinchZoom {
            distance,
            pixel_size,
        })
    }

    fn on_pinch_end(
        &mut self,
        _pointers: &[PointerEvent; 2],
        _start: Option<&PinchZoom>,
        prev: Option<&PinchZoom>,
    ) {
        self.zoom_preview = None;
        if let Some(zoom) = prev.filter(|zoom| zoom.pixel_size != self.pixel_size) {
            self.queue.push(Command::SetPixelSize {
                drawing_id: self.drawing_id.clone(),
                pixel_size: zoom.pixel_size,
            });
        }
    }
}

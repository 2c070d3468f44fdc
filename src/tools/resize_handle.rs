use egui::{CursorIcon, Pos2, Rect, Vec2};

use super::CommandQueue;
use crate::command::Command;
use crate::document::Drawing;
use crate::geometry::GridRect;
use crate::input::{GestureHandler, PointerEvent};

/// Represents a corner of a drawing's canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Corner::TopLeft => CursorIcon::ResizeNwSe,
            Corner::TopRight => CursorIcon::ResizeNeSw,
            Corner::BottomLeft => CursorIcon::ResizeNeSw,
            Corner::BottomRight => CursorIcon::ResizeNwSe,
        }
    }

    pub fn point(&self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    /// Square grab area centered on this corner of `canvas`.
    pub fn handle_rect(&self, canvas: Rect, size: f32) -> Rect {
        Rect::from_center_size(self.point(canvas), Vec2::splat(size))
    }

    /// The resize mask for a `rows` x `columns` grid after dragging this
    /// corner by (`d_row`, `d_col`) cells. The two edges meeting at the
    /// corner move and the opposite edges stay. A grid never shrinks below
    /// one cell per axis.
    pub fn mask(&self, rows: usize, columns: usize, d_row: i32, d_col: i32) -> GridRect {
        let GridRect { mut start, mut end } = GridRect::covering(rows, columns);
        let (top, left) = match self {
            Corner::TopLeft => (true, true),
            Corner::TopRight => (true, false),
            Corner::BottomLeft => (false, true),
            Corner::BottomRight => (false, false),
        };

        if top {
            start.row = start.row.saturating_add(d_row).min(end.row);
        } else {
            end.row = end.row.saturating_add(d_row).max(start.row);
        }
        if left {
            start.col = start.col.saturating_add(d_col).min(end.col);
        } else {
            end.col = end.col.saturating_add(d_col).max(start.col);
        }

        GridRect::new(start, end)
    }
}

/// Drag accumulator for a resize handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    pub pointer_start: Pos2,
    pub mask: GridRect,
}

/// One corner handle of a drawing. Dragging it previews the new bounds and
/// releasing it commits a single resize.
#[derive(Debug)]
pub struct ResizeHandleTool {
    queue: CommandQueue,
    corner: Corner,
    drawing_id: String,
    rows: usize,
    columns: usize,
    pixel_size: f32,
    selection: Option<GridRect>,
}

impl ResizeHandleTool {
    pub fn new(queue: CommandQueue, corner: Corner, drawing: &Drawing) -> Self {
        let mut tool = Self {
            queue,
            corner,
            drawing_id: String::new(),
            rows: 0,
            columns: 0,
            pixel_size: 1.0,
            selection: None,
        };
        tool.sync(drawing);
        tool
    }

    pub fn sync(&mut self, drawing: &Drawing) {
        self.drawing_id = drawing.id().to_string();
        self.rows = drawing.row_count();
        self.columns = drawing.column_count();
        self.pixel_size = drawing.pixel_size() as f32;
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// The mask being dragged out, in the drawing's cell coordinates.
    pub fn selection(&self) -> Option<GridRect> {
        self.selection
    }

    fn mask_for(&self, start: Pos2, now: Pos2) -> GridRect {
        let delta = (now - start) / self.pixel_size;
        self.corner.mask(
            self.rows,
            self.columns,
            delta.y.round() as i32,
            delta.x.round() as i32,
        )
    }
}

impl GestureHandler for ResizeHandleTool {
    type Drag = ResizeDrag;
    type Pinch = ();

    fn on_drag_start(&mut self, event: &PointerEvent) -> Option<ResizeDrag> {
        let mask = GridRect::covering(self.rows, self.columns);
        self.selection = Some(mask);
        Some(ResizeDrag {
            pointer_start: event.pos,
            mask,
        })
    }

    fn on_drag_move(
        &mut self,
        event: &PointerEvent,
        start: Option<&ResizeDrag>,
        _prev: Option<&ResizeDrag>,
    ) -> Option<ResizeDrag> {
        let start = start?;
        let mask = self.mask_for(start.pointer_start, event.pos);
        self.selection = Some(mask);
        Some(ResizeDrag {
            pointer_start: start.pointer_start,
            mask,
        })
    }

    fn on_drag_end(
        &mut self,
        event: &PointerEvent,
        start: Option<&ResizeDrag>,
        _prev: Option<&ResizeDrag>,
    ) {
        self.selection = None;
        let Some(start) = start else {
            return;
        };
        self.queue.push(Command::ResizeDrawing {
            drawing_id: self.drawing_id.clone(),
            rect: self.mask_for(start.pointer_start, event.pos),
        });
    }
}

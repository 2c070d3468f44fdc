mod interpolate;

pub use interpolate::interpolate;

use serde::{Deserialize, Serialize};

/// A cell coordinate. Signed so that resize masks can reach past the grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// True when this cell and `other` touch, diagonals included.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        *self != *other && (self.row - other.row).abs() <= 1 && (self.col - other.col).abs() <= 1
    }
}

/// Inclusive cell rectangle. Corners may come in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub start: Position,
    pub end: Position,
}

impl GridRect {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Covers a whole `rows` x `columns` grid.
    pub fn covering(rows: usize, columns: usize) -> Self {
        Self {
            start: Position::new(0, 0),
            end: Position::new(rows as i32 - 1, columns as i32 - 1),
        }
    }

    /// Same cells, with `start` the top-left and `end` the bottom-right corner.
    pub fn normalized(&self) -> Self {
        Self {
            start: Position::new(
                self.start.row.min(self.end.row),
                self.start.col.min(self.end.col),
            ),
            end: Position::new(
                self.start.row.max(self.end.row),
                self.start.col.max(self.end.col),
            ),
        }
    }

    pub fn row_count(&self) -> usize {
        span(self.start.row, self.end.row)
    }

    pub fn column_count(&self) -> usize {
        span(self.start.col, self.end.col)
    }

    pub fn contains(&self, position: Position) -> bool {
        let rect = self.normalized();
        (rect.start.row..=rect.end.row).contains(&position.row)
            && (rect.start.col..=rect.end.col).contains(&position.col)
    }
}

// i64 so that corners at opposite ends of the i32 range cannot overflow
fn span(a: i32, b: i32) -> usize {
    (i64::from(a) - i64::from(b)).unsigned_abs() as usize + 1
}

/// Maps a point in canvas-local coordinates to the cell under it.
pub fn cell_at(point: egui::Pos2, cell_size: f32) -> Position {
    cell_at_f64(f64::from(point.x), f64::from(point.y), f64::from(cell_size))
}

pub(crate) fn cell_at_f64(x: f64, y: f64, cell_size: f64) -> Position {
    Position::new((y / cell_size).floor() as i32, (x / cell_size).floor() as i32)
}

use thiserror::Error;

use crate::document::{MAX_GRID_SIZE, MAX_PALETTE_SIZE, MAX_PIXEL_SIZE, MIN_PIXEL_SIZE};

/// Failures raised by the document model.
///
/// Lookups by id never fall back to a default: a missing drawing or panel is
/// always reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("drawing `{0}` not found")]
    DrawingNotFound(String),

    #[error("panel `{0}` not found")]
    PanelNotFound(String),

    #[error("a panel for drawing `{0}` is already open")]
    PanelAlreadyOpen(String),

    #[error("duplicate drawing id `{0}`")]
    DuplicateDrawing(String),

    #[error("duplicate panel id `{0}`")]
    DuplicatePanel(String),

    #[error("cell ({row}, {col}) is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: i32,
        col: i32,
        rows: usize,
        columns: usize,
    },

    #[error("a grid needs at least one row and one column")]
    EmptyGrid,

    #[error("a {rows}x{columns} grid exceeds the {max}x{max} limit", max = MAX_GRID_SIZE)]
    GridTooLarge { rows: usize, columns: usize },

    #[error("pixel size {0} is outside {min}..={max}", min = MIN_PIXEL_SIZE, max = MAX_PIXEL_SIZE)]
    PixelSizeOutOfRange(u32),

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("name must not be empty")]
    EmptyName,

    #[error("palette index {0} is past the {max} slot limit", max = MAX_PALETTE_SIZE)]
    PaletteIndexOutOfRange(usize),
}

use std::sync::Arc;

use super::{
    DEFAULT_COLUMNS, DEFAULT_PIXEL_SIZE, DEFAULT_ROWS, MAX_GRID_SIZE, MAX_PIXEL_SIZE, MIN_PIXEL_SIZE,
};
use crate::color::Color;
use crate::error::ModelError;
use crate::geometry::{GridRect, Position};
use crate::id_generator::generate_document_id;

/// One grid row. Shared between snapshots until a cell in it changes.
pub type Row = Arc<Vec<Option<Color>>>;

/// A named pixel grid. Every row has exactly `column_count` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    id: String,
    name: String,
    pixel_size: u32,
    rows: Vec<Row>,
    columns: usize,
}

impl Drawing {
    /// An empty `rows` x `columns` drawing with a fresh id.
    pub fn new(name: impl Into<String>, rows: usize, columns: usize) -> Result<Self, ModelError> {
        check_size(rows, columns)?;

        Ok(Self {
            id: generate_document_id(),
            name: name.into(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            rows: (0..rows).map(|_| Arc::new(vec![None; columns])).collect(),
            columns,
        })
    }

    /// The default-sized drawing, narrowed so it fits in `viewport_width` points.
    pub fn with_default_size(name: impl Into<String>, viewport_width: f32) -> Self {
        let fitting = (viewport_width / DEFAULT_PIXEL_SIZE as f32).floor().max(1.0) as usize;
        let columns = DEFAULT_COLUMNS.min(fitting);

        Self {
            id: generate_document_id(),
            name: name.into(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            rows: (0..DEFAULT_ROWS)
                .map(|_| Arc::new(vec![None; columns]))
                .collect(),
            columns,
        }
    }

    /// Builds a drawing from existing cells, rejecting empty, oversized or
    /// ragged grids and pixel sizes outside the supported range.
    pub fn from_rows(
        id: impl Into<String>,
        name: impl Into<String>,
        pixel_size: u32,
        rows: Vec<Vec<Option<Color>>>,
    ) -> Result<Self, ModelError> {
        if !(MIN_PIXEL_SIZE..=MAX_PIXEL_SIZE).contains(&pixel_size) {
            return Err(ModelError::PixelSizeOutOfRange(pixel_size));
        }
        let columns = rows.first().map_or(0, Vec::len);
        check_size(rows.len(), columns)?;
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(ModelError::RaggedRow {
                row,
                found: cells.len(),
                expected: columns,
            });
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            pixel_size,
            rows: rows.into_iter().map(Arc::new).collect(),
            columns,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Size of the whole grid on screen, in points.
    pub fn display_size(&self) -> egui::Vec2 {
        let px = self.pixel_size as f32;
        egui::vec2(self.columns as f32 * px, self.rows.len() as f32 * px)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<Color>]> + '_ {
        self.rows.iter().map(|row| row.as_slice())
    }

    /// Raw row handles, for checking which rows two snapshots share.
    pub fn row_handles(&self) -> &[Row] {
        &self.rows
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    pub fn pixel(&self, position: Position) -> Result<Option<Color>, ModelError> {
        let (row, col) = self.checked_index(position)?;
        Ok(self.rows[row][col])
    }

    /// Writes one cell. Returns `false` when the cell already held `color`.
    pub fn set_pixel(&mut self, position: Position, color: Option<Color>) -> Result<bool, ModelError> {
        let (row, col) = self.checked_index(position)?;
        if self.rows[row][col] == color {
            return Ok(false);
        }
        Arc::make_mut(&mut self.rows[row])[col] = color;
        Ok(true)
    }

    /// Crops and pads the grid to `mask`, given in this grid's own coordinates.
    ///
    /// Each edge moves on its own: a negative `start` grows empty rows or
    /// columns on the top/left, a positive one crops them, and `end` does the
    /// same against the bottom/right edge. Rows whose column span survives
    /// untouched are kept shared. Returns `false` if the mask is the current
    /// grid, and fails without touching the grid if the result would exceed
    /// [`MAX_GRID_SIZE`].
    pub fn resize(&mut self, mask: GridRect) -> Result<bool, ModelError> {
        let mask = mask.normalized();
        if mask == GridRect::covering(self.rows.len(), self.columns) {
            return Ok(false);
        }

        let columns = mask.column_count();
        check_size(mask.row_count(), columns)?;
        let same_span = mask.start.col == 0 && columns == self.columns;
        let rows = (mask.start.row..=mask.end.row)
            .map(|r| match usize::try_from(r).ok().and_then(|r| self.rows.get(r)) {
                Some(row) if same_span => Arc::clone(row),
                Some(row) => Arc::new(
                    (mask.start.col..=mask.end.col)
                        .map(|c| usize::try_from(c).ok().and_then(|c| row.get(c)).copied().flatten())
                        .collect(),
                ),
                None => Arc::new(vec![None; columns]),
            })
            .collect();

        self.rows = rows;
        self.columns = columns;
        Ok(true)
    }

    pub fn rename(&mut self, name: &str) -> Result<bool, ModelError> {
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        if self.name == name {
            return Ok(false);
        }
        self.name = name.to_string();
        Ok(true)
    }

    /// Clamps to the supported range. Returns `false` if nothing changed.
    pub fn set_pixel_size(&mut self, pixel_size: u32) -> bool {
        let pixel_size = pixel_size.clamp(MIN_PIXEL_SIZE, MAX_PIXEL_SIZE);
        if self.pixel_size == pixel_size {
            return false;
        }
        self.pixel_size = pixel_size;
        true
    }

    /// A copy under a new id. The copy shares every row with `self`.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            id: generate_document_id(),
            name: name.into(),
            ..self.clone()
        }
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        (row < self.rows.len() && col < self.columns).then_some((row, col))
    }

    fn checked_index(&self, position: Position) -> Result<(usize, usize), ModelError> {
        self.index(position).ok_or(ModelError::OutOfBounds {
            row: position.row,
            col: position.col,
            rows: self.rows.len(),
            columns: self.columns,
        })
    }
}

fn check_size(rows: usize, columns: usize) -> Result<(), ModelError> {
    if rows == 0 || columns == 0 {
        return Err(ModelError::EmptyGrid);
    }
    if rows > MAX_GRID_SIZE || columns > MAX_GRID_SIZE {
        return Err(ModelError::GridTooLarge { rows, columns });
    }
    Ok(())
}

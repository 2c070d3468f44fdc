//! The editable document: a [`Project`] of [`Drawing`]s shown in [`Panel`]s.
//!
//! Every aggregate is cheap to clone. Drawings and panels sit behind `Arc`s
//! and grid rows are `Arc`-shared too, so a snapshot clone copies pointers
//! and an edit copies only the row or object it touches.

mod drawing;
mod panel;
mod project;

pub use drawing::{Drawing, Row};
pub use panel::{Panel, PanelKind, ZOffset};
pub use project::Project;

pub const DEFAULT_ROWS: usize = 16;
pub const DEFAULT_COLUMNS: usize = 16;

/// On-screen edge length of one cell, in points.
pub const DEFAULT_PIXEL_SIZE: u32 = 20;
pub const MIN_PIXEL_SIZE: u32 = 1;
pub const MAX_PIXEL_SIZE: u32 = 128;

/// Largest number of rows or columns a drawing can have.
pub const MAX_GRID_SIZE: usize = 1024;

pub const MAX_PALETTE_SIZE: usize = 256;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled";
pub const DEFAULT_DRAWING_NAME: &str = "Drawing";

// Where new panels appear, and how far each one steps from the last
pub const PANEL_ORIGIN: (f32, f32) = (40.0, 60.0);
pub const PANEL_CASCADE: f32 = 24.0;
const PANEL_CASCADE_STEPS: usize = 8;

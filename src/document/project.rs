use std::collections::HashSet;
use std::sync::Arc;

use super::{
    Drawing, Panel, ZOffset, DEFAULT_DRAWING_NAME, DEFAULT_PROJECT_NAME, MAX_PALETTE_SIZE,
    PANEL_CASCADE, PANEL_CASCADE_STEPS, PANEL_ORIGIN,
};
use crate::color::Color;
use crate::error::ModelError;
use crate::id_generator::generate_document_id;

/// The whole document.
///
/// Drawings keep their insertion order. The panel list is the z-stack: the
/// last panel is drawn on top and is the active one. The palette never ends
/// in an empty slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: String,
    name: String,
    drawings: Vec<Arc<Drawing>>,
    panels: Vec<Arc<Panel>>,
    palette: Vec<Option<Color>>,
}

impl Project {
    /// An empty project, without drawings or panels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_document_id(),
            name: name.into(),
            drawings: Vec::new(),
            panels: Vec::new(),
            palette: Vec::new(),
        }
    }

    /// A fresh project holding one default drawing with its panel open.
    pub fn with_default_drawing(viewport_width: f32) -> Self {
        let drawing = Drawing::with_default_size(DEFAULT_DRAWING_NAME, viewport_width);
        let (x, y) = PANEL_ORIGIN;
        let panel = Panel::for_drawing(drawing.id(), x, y);

        Self {
            drawings: vec![Arc::new(drawing)],
            panels: vec![Arc::new(panel)],
            ..Self::new(DEFAULT_PROJECT_NAME)
        }
    }

    /// Assembles a project from loaded parts, checking every cross-reference.
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        drawings: Vec<Drawing>,
        panels: Vec<Panel>,
        mut palette: Vec<Option<Color>>,
    ) -> Result<Self, ModelError> {
        let mut drawing_ids = HashSet::new();
        for drawing in &drawings {
            if !drawing_ids.insert(drawing.id()) {
                return Err(ModelError::DuplicateDrawing(drawing.id().to_string()));
            }
        }

        let mut panel_ids = HashSet::new();
        let mut shown = HashSet::new();
        for panel in &panels {
            if !panel_ids.insert(panel.id()) {
                return Err(ModelError::DuplicatePanel(panel.id().to_string()));
            }
            if let Some(drawing_id) = panel.drawing_id() {
                if !drawing_ids.contains(drawing_id) {
                    return Err(ModelError::DrawingNotFound(drawing_id.to_string()));
                }
                if !shown.insert(drawing_id) {
                    return Err(ModelError::PanelAlreadyOpen(drawing_id.to_string()));
                }
            }
        }

        trim_palette(&mut palette);
        if palette.len() > MAX_PALETTE_SIZE {
            return Err(ModelError::PaletteIndexOutOfRange(palette.len() - 1));
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            drawings: drawings.into_iter().map(Arc::new).collect(),
            panels: panels.into_iter().map(Arc::new).collect(),
            palette,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn drawings(&self) -> impl Iterator<Item = &Drawing> + '_ {
        self.drawings.iter().map(|drawing| drawing.as_ref())
    }

    pub fn drawing_count(&self) -> usize {
        self.drawings.len()
    }

    /// Panels from bottom to top.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels.iter().map(|panel| panel.as_ref())
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn palette(&self) -> &[Option<Color>] {
        &self.palette
    }

    pub fn drawing(&self, drawing_id: &str) -> Result<&Drawing, ModelError> {
        self.drawings
            .iter()
            .find(|drawing| drawing.id() == drawing_id)
            .map(|drawing| drawing.as_ref())
            .ok_or_else(|| ModelError::DrawingNotFound(drawing_id.to_string()))
    }

    /// Mutable access. Clones the drawing first if another snapshot shares it.
    pub fn drawing_mut(&mut self, drawing_id: &str) -> Result<&mut Drawing, ModelError> {
        self.drawings
            .iter_mut()
            .find(|drawing| drawing.id() == drawing_id)
            .map(Arc::make_mut)
            .ok_or_else(|| ModelError::DrawingNotFound(drawing_id.to_string()))
    }

    pub fn panel(&self, panel_id: &str) -> Result<&Panel, ModelError> {
        self.panels
            .iter()
            .find(|panel| panel.id() == panel_id)
            .map(|panel| panel.as_ref())
            .ok_or_else(|| ModelError::PanelNotFound(panel_id.to_string()))
    }

    pub fn panel_mut(&mut self, panel_id: &str) -> Result<&mut Panel, ModelError> {
        self.panels
            .iter_mut()
            .find(|panel| panel.id() == panel_id)
            .map(Arc::make_mut)
            .ok_or_else(|| ModelError::PanelNotFound(panel_id.to_string()))
    }

    pub fn panel_for_drawing(&self, drawing_id: &str) -> Option<&Panel> {
        self.panels()
            .find(|panel| panel.drawing_id() == Some(drawing_id))
    }

    pub fn panel_for_drawing_mut(&mut self, drawing_id: &str) -> Option<&mut Panel> {
        self.panels
            .iter_mut()
            .find(|panel| panel.drawing_id() == Some(drawing_id))
            .map(Arc::make_mut)
    }

    /// The topmost panel.
    pub fn active_panel(&self) -> Option<&Panel> {
        self.panels.last().map(|panel| panel.as_ref())
    }

    /// True when both projects hold the very same allocation for `drawing_id`.
    pub fn shares_drawing_with(&self, other: &Project, drawing_id: &str) -> bool {
        let find = |project: &Project| {
            project
                .drawings
                .iter()
                .find(|drawing| drawing.id() == drawing_id)
                .cloned()
        };
        matches!((find(self), find(other)), (Some(a), Some(b)) if Arc::ptr_eq(&a, &b))
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

    pub fn add_drawing(&mut self, drawing: Drawing) -> Result<(), ModelError> {
        if self.drawing(drawing.id()).is_ok() {
            return Err(ModelError::DuplicateDrawing(drawing.id().to_string()));
        }
        self.drawings.push(Arc::new(drawing));
        Ok(())
    }

    /// Removes a drawing together with its panel, if one is open.
    pub fn remove_drawing(&mut self, drawing_id: &str) -> Result<Arc<Drawing>, ModelError> {
        let index = self
            .drawings
            .iter()
            .position(|drawing| drawing.id() == drawing_id)
            .ok_or_else(|| ModelError::DrawingNotFound(drawing_id.to_string()))?;

        self.panels
            .retain(|panel| panel.drawing_id() != Some(drawing_id));
        Ok(self.drawings.remove(index))
    }

    /// `name`, or `name` with the smallest free ` (n)` suffix if another
    /// drawing already uses it. A trailing ` (n)` on `name` is replaced, not
    /// stacked. The drawing `exclude` does not count as a collision.
    pub fn unique_drawing_name(&self, name: &str, exclude: Option<&str>) -> String {
        let taken = |candidate: &str| {
            self.drawings()
                .any(|drawing| Some(drawing.id()) != exclude && drawing.name() == candidate)
        };
        if !taken(name) {
            return name.to_string();
        }

        let base = strip_number_suffix(name);
        let mut n = 1;
        loop {
            let candidate = format!("{base} ({n})");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Opens a panel on top of the stack and returns its id.
    pub fn open_panel(&mut self, drawing_id: &str, x: f32, y: f32) -> Result<String, ModelError> {
        self.drawing(drawing_id)?;
        if self.panel_for_drawing(drawing_id).is_some() {
            return Err(ModelError::PanelAlreadyOpen(drawing_id.to_string()));
        }

        let panel = Panel::for_drawing(drawing_id, x, y);
        let id = panel.id().to_string();
        self.panels.push(Arc::new(panel));
        Ok(id)
    }

    pub fn close_panel(&mut self, panel_id: &str) -> Result<Arc<Panel>, ModelError> {
        let index = self.panel_index(panel_id)?;
        Ok(self.panels.remove(index))
    }

    /// Moves a panel within the z-stack. Returns `false` if it stays put.
    pub fn move_panel_z(&mut self, panel_id: &str, offset: ZOffset) -> Result<bool, ModelError> {
        let from = self.panel_index(panel_id)?;
        let to = offset.target(from, self.panels.len());
        if from == to {
            return Ok(false);
        }

        let panel = self.panels.remove(from);
        self.panels.insert(to, panel);
        Ok(true)
    }

    /// Writes one palette slot, growing the palette with empty slots as needed.
    pub fn set_palette(&mut self, index: usize, color: Option<Color>) -> Result<bool, ModelError> {
        if index >= MAX_PALETTE_SIZE {
            return Err(ModelError::PaletteIndexOutOfRange(index));
        }
        if self.palette.get(index).copied().flatten() == color {
            return Ok(false);
        }

        if index >= self.palette.len() {
            self.palette.resize(index + 1, None);
        }
        self.palette[index] = color;
        trim_palette(&mut self.palette);
        Ok(true)
    }

    /// Where the next opened panel goes, cascading from the workspace origin.
    pub fn next_panel_position(&self) -> (f32, f32) {
        let (x, y) = PANEL_ORIGIN;
        let step = (self.panels.len() % PANEL_CASCADE_STEPS) as f32 * PANEL_CASCADE;
        (x + step, y + step)
    }

    fn panel_index(&self, panel_id: &str) -> Result<usize, ModelError> {
        self.panels
            .iter()
            .position(|panel| panel.id() == panel_id)
            .ok_or_else(|| ModelError::PanelNotFound(panel_id.to_string()))
    }
}

fn trim_palette(palette: &mut Vec<Option<Color>>) {
    while palette.last().is_some_and(Option::is_none) {
        palette.pop();
    }
}

fn strip_number_suffix(name: &str) -> &str {
    let Some(open) = name.strip_suffix(')').and_then(|rest| rest.rfind(" (")) else {
        return name;
    };
    let digits = &name[open + 2..name.len() - 1];
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        &name[..open]
    } else {
        name
    }
}

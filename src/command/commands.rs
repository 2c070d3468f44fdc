use std::fmt;

use super::{CommandContext, CommandResult};
use crate::color::Color;
use crate::document::{Drawing, Project, ZOffset, DEFAULT_DRAWING_NAME, DEFAULT_PIXEL_SIZE};
use crate::error::ModelError;
use crate::geometry::{GridRect, Position};
use crate::id_generator::{generate_document_id, generate_id};
use crate::state::persistence;

/// Identifies one continuous gesture. Every edit a single drag produces
/// carries the same token, so the whole drag undoes in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainToken(usize);

impl ChainToken {
    pub fn mint() -> Self {
        Self(generate_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    NewProject,
    Load,
    Rename,
    AddDrawing,
    ImportDrawing,
    RenameDrawing,
    DeleteDrawing,
    CopyDrawing,
    SetPixel,
    ResizeDrawing,
    SetPixelSize,
    SetPalette,
    OpenPanel,
    ClosePanel,
    SetPanelZ,
    MovePanel,
    Undo,
    Redo,
}

/// What a history entry is coalesced on: a command kind and its gesture token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainKey {
    pub kind: CommandKind,
    pub token: ChainToken,
}

/// Decoded image cells waiting to become a drawing.
#[derive(Clone, PartialEq)]
pub struct ImportedPixels(pub Vec<Vec<Option<Color>>>);

impl fmt::Debug for ImportedPixels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.0.first().map_or(0, Vec::len);
        write!(f, "ImportedPixels({}x{})", self.0.len(), columns)
    }
}

/// Every edit the editor can make to a project
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the document with a fresh one-drawing project
    NewProject,
    /// Replace the document with a serialized project
    Load { document: String },
    Rename { name: String },
    /// Add a default-sized drawing and open it
    AddDrawing,
    /// Add a drawing built from image pixels and open it
    ImportDrawing { name: String, pixels: ImportedPixels },
    RenameDrawing { drawing_id: String, name: String },
    DeleteDrawing { drawing_id: String },
    /// Duplicate a drawing under a free name. The copy is not opened.
    CopyDrawing { drawing_id: String },
    SetPixel {
        drawing_id: String,
        position: Position,
        color: Option<Color>,
        chain: Option<ChainToken>,
    },
    /// Crop/pad to `rect` and shift the panel so the kept cells stay put on screen
    ResizeDrawing { drawing_id: String, rect: GridRect },
    SetPixelSize { drawing_id: String, pixel_size: u32 },
    SetPalette { index: usize, color: Option<Color> },
    OpenPanel { drawing_id: String, x: f32, y: f32 },
    ClosePanel { panel_id: String },
    SetPanelZ { panel_id: String, offset: ZOffset },
    MovePanel {
        panel_id: String,
        x: f32,
        y: f32,
        chain: Option<ChainToken>,
    },
    Undo,
    Redo,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::NewProject => CommandKind::NewProject,
            Command::Load { .. } => CommandKind::Load,
            Command::Rename { .. } => CommandKind::Rename,
            Command::AddDrawing => CommandKind::AddDrawing,
            Command::ImportDrawing { .. } => CommandKind::ImportDrawing,
            Command::RenameDrawing { .. } => CommandKind::RenameDrawing,
            Command::DeleteDrawing { .. } => CommandKind::DeleteDrawing,
            Command::CopyDrawing { .. } => CommandKind::CopyDrawing,
            Command::SetPixel { .. } => CommandKind::SetPixel,
            Command::ResizeDrawing { .. } => CommandKind::ResizeDrawing,
            Command::SetPixelSize { .. } => CommandKind::SetPixelSize,
            Command::SetPalette { .. } => CommandKind::SetPalette,
            Command::OpenPanel { .. } => CommandKind::OpenPanel,
            Command::ClosePanel { .. } => CommandKind::ClosePanel,
            Command::SetPanelZ { .. } => CommandKind::SetPanelZ,
            Command::MovePanel { .. } => CommandKind::MovePanel,
            Command::Undo => CommandKind::Undo,
            Command::Redo => CommandKind::Redo,
        }
    }

    /// The coalescing key, for commands that belong to a gesture.
    pub fn chain_key(&self) -> Option<ChainKey> {
        let token = match self {
            Command::SetPixel { chain, .. } | Command::MovePanel { chain, .. } => (*chain)?,
            _ => return None,
        };
        Some(ChainKey {
            kind: self.kind(),
            token,
        })
    }

    /// Computes the snapshot this command produces from `project`.
    ///
    /// `project` itself is never modified. `Ok(None)` means the command would
    /// change nothing. Undo and redo move the history cursor rather than
    /// produce a snapshot, so they always return `Ok(None)` here.
    pub fn apply(&self, project: &Project, ctx: &CommandContext) -> CommandResult<Option<Project>> {
        match self {
            Command::NewProject => Ok(Some(Project::with_default_drawing(ctx.viewport_width))),

            Command::Load { document } => Ok(Some(persistence::deserialize(document.as_bytes())?)),

            Command::Rename { name } => edit(project, |p| p.rename(name)),

            Command::AddDrawing => edit(project, |p| {
                let name = p.unique_drawing_name(DEFAULT_DRAWING_NAME, None);
                let drawing = Drawing::with_default_size(name, ctx.viewport_width);
                add_and_open(p, drawing)
            }),

            Command::ImportDrawing { name, pixels } => edit(project, |p| {
                let name = p.unique_drawing_name(name, None);
                let drawing = Drawing::from_rows(
                    generate_document_id(),
                    name,
                    DEFAULT_PIXEL_SIZE,
                    pixels.0.clone(),
                )?;
                add_and_open(p, drawing)
            }),

            Command::RenameDrawing { drawing_id, name } => edit(project, |p| {
                let name = p.unique_drawing_name(name, Some(drawing_id.as_str()));
                p.drawing_mut(drawing_id)?.rename(&name)
            }),

            Command::DeleteDrawing { drawing_id } => edit(project, |p| {
                p.remove_drawing(drawing_id)?;
                Ok(true)
            }),

            Command::CopyDrawing { drawing_id } => edit(project, |p| {
                let source = p.drawing(drawing_id)?;
                let name = p.unique_drawing_name(source.name(), None);
                let copy = source.duplicate(name);
                p.add_drawing(copy)?;
                Ok(true)
            }),

            Command::SetPixel {
                drawing_id,
                position,
                color,
                ..
            } => edit(project, |p| p.drawing_mut(drawing_id)?.set_pixel(*position, *color)),

            Command::ResizeDrawing { drawing_id, rect } => edit(project, |p| {
                let rect = rect.normalized();
                let drawing = p.drawing_mut(drawing_id)?;
                let px = drawing.pixel_size() as f32;
                if !drawing.resize(rect)? {
                    return Ok(false);
                }
                if let Some(panel) = p.panel_for_drawing_mut(drawing_id) {
                    panel.translate(rect.start.col as f32 * px, rect.start.row as f32 * px);
                }
                Ok(true)
            }),

            Command::SetPixelSize {
                drawing_id,
                pixel_size,
            } => edit(project, |p| {
                Ok(p.drawing_mut(drawing_id)?.set_pixel_size(*pixel_size))
            }),

            Command::SetPalette { index, color } => edit(project, |p| p.set_palette(*index, *color)),

            Command::OpenPanel { drawing_id, x, y } => edit(project, |p| {
                p.open_panel(drawing_id, *x, *y)?;
                Ok(true)
            }),

            Command::ClosePanel { panel_id } => edit(project, |p| {
                p.close_panel(panel_id)?;
                Ok(true)
            }),

            Command::SetPanelZ { panel_id, offset } => {
                edit(project, |p| p.move_panel_z(panel_id, *offset))
            }

            Command::MovePanel { panel_id, x, y, .. } => {
                edit(project, |p| Ok(p.panel_mut(panel_id)?.move_to(*x, *y)))
            }

            Command::Undo | Command::Redo => Ok(None),
        }
    }
}

/// Runs `mutate` on a copy of `project`. The copy is kept only if it changed.
fn edit(
    project: &Project,
    mutate: impl FnOnce(&mut Project) -> Result<bool, ModelError>,
) -> CommandResult<Option<Project>> {
    let mut next = project.clone();
    Ok(mutate(&mut next)?.then_some(next))
}

fn add_and_open(project: &mut Project, drawing: Drawing) -> Result<bool, ModelError> {
    let (x, y) = project.next_panel_position();
    let drawing_id = drawing.id().to_string();
    project.add_drawing(drawing)?;
    project.open_panel(&drawing_id, x, y)?;
    Ok(true)
}

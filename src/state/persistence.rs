//! The on-disk project format.
//!
//! ```json
//! {"id":"…","name":"…","palette":[{"rgb":[255,0,0]},null],
//!  "drawings":[{"id":"…","name":"…","pixelSize":20,"data":[[null,{"hsv":[0,100,100]}]]}],
//!  "panels":[{"id":"…","x":40,"y":60,"type":"drawing","drawingId":"…"}]}
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::document::{Drawing, Panel, PanelKind, Project};
use crate::error::ModelError;
use crate::event::{EditorEvent, EventHandler};

/// Errors that can occur while reading or writing a project document
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Malformed JSON, a missing or mistyped field, or an unknown tag
    #[error("malformed project document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("drawing `{id}` is invalid: {source}")]
    InvalidDrawing {
        id: String,
        #[source]
        source: ModelError,
    },

    #[error("inconsistent project document: {0}")]
    Invalid(#[from] ModelError),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Serialize, Deserialize)]
struct ProjectJson {
    id: String,
    name: String,
    drawings: Vec<DrawingJson>,
    palette: Vec<Option<Color>>,
    panels: Vec<PanelJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrawingJson {
    id: String,
    name: String,
    pixel_size: u32,
    data: Vec<Vec<Option<Color>>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PanelJson {
    id: String,
    x: f32,
    y: f32,
    #[serde(flatten)]
    kind: PanelKindJson,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum PanelKindJson {
    #[serde(rename = "drawing", rename_all = "camelCase")]
    Drawing { drawing_id: String },
}

impl From<&Project> for ProjectJson {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().to_string(),
            name: project.name().to_string(),
            drawings: project
                .drawings()
                .map(|drawing| DrawingJson {
                    id: drawing.id().to_string(),
                    name: drawing.name().to_string(),
                    pixel_size: drawing.pixel_size(),
                    data: drawing.rows().map(<[_]>::to_vec).collect(),
                })
                .collect(),
            palette: project.palette().to_vec(),
            panels: project
                .panels()
                .map(|panel| PanelJson {
                    id: panel.id().to_string(),
                    x: panel.x(),
                    y: panel.y(),
                    kind: match panel.kind() {
                        PanelKind::Drawing { drawing_id } => PanelKindJson::Drawing {
                            drawing_id: drawing_id.clone(),
                        },
                    },
                })
                .collect(),
        }
    }
}

impl TryFrom<ProjectJson> for Project {
    type Error = PersistenceError;

    fn try_from(json: ProjectJson) -> PersistenceResult<Self> {
        let drawings = json
            .drawings
            .into_iter()
            .map(|drawing| {
                Drawing::from_rows(drawing.id.clone(), drawing.name, drawing.pixel_size, drawing.data)
                    .map_err(|source| PersistenceError::InvalidDrawing {
                        id: drawing.id,
                        source,
                    })
            })
            .collect::<PersistenceResult<Vec<_>>>()?;

        let panels = json
            .panels
            .into_iter()
            .map(|panel| {
                let kind = match panel.kind {
                    PanelKindJson::Drawing { drawing_id } => PanelKind::Drawing { drawing_id },
                };
                Panel::from_parts(panel.id, panel.x, panel.y, kind)
            })
            .collect();

        Ok(Project::from_parts(json.id, json.name, drawings, panels, json.palette)?)
    }
}

pub fn serialize(project: &Project) -> PersistenceResult<Vec<u8>> {
    Ok(serde_json::to_vec(&ProjectJson::from(project))?)
}

pub fn serialize_to_string(project: &Project) -> PersistenceResult<String> {
    Ok(serde_json::to_string(&ProjectJson::from(project))?)
}

/// Parses and validates a project document.
pub fn deserialize(bytes: &[u8]) -> PersistenceResult<Project> {
    let json: ProjectJson = serde_json::from_slice(bytes)?;
    Project::try_from(json)
}

/// The latest serialized snapshot not yet handed to storage.
#[derive(Debug, Clone, Default)]
pub struct PendingSave(Rc<RefCell<Option<String>>>);

impl PendingSave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        self.0.borrow_mut().take()
    }

    pub fn is_pending(&self) -> bool {
        self.0.borrow().is_some()
    }

    fn replace(&self, document: String) {
        *self.0.borrow_mut() = Some(document);
    }
}

/// Serializes every settled snapshot into a [`PendingSave`].
#[derive(Debug)]
pub struct Autosave {
    pending: PendingSave,
}

impl Autosave {
    pub fn new(pending: PendingSave) -> Self {
        Self { pending }
    }
}

impl EventHandler for Autosave {
    fn handle_event(&mut self, event: &EditorEvent) {
        if let EditorEvent::SnapshotSettled { snapshot, .. } = event {
            match serialize_to_string(snapshot) {
                Ok(document) => self.pending.replace(document),
                Err(err) => log::error!("Autosave failed: {err}"),
            }
        }
    }
}

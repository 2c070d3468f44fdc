use crate::id_generator::generate_document_id;

/// What a panel shows. The serialized `type` tag picks the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Drawing { drawing_id: String },
}

/// A movable frame on the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    id: String,
    x: f32,
    y: f32,
    kind: PanelKind,
}

impl Panel {
    pub fn new(kind: PanelKind, x: f32, y: f32) -> Self {
        Self::from_parts(generate_document_id(), x, y, kind)
    }

    pub fn for_drawing(drawing_id: impl Into<String>, x: f32, y: f32) -> Self {
        Self::new(
            PanelKind::Drawing {
                drawing_id: drawing_id.into(),
            },
            x,
            y,
        )
    }

    pub fn from_parts(id: impl Into<String>, x: f32, y: f32, kind: PanelKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    pub fn kind(&self) -> &PanelKind {
        &self.kind
    }

    /// The drawing this panel displays, if it is a drawing panel.
    pub fn drawing_id(&self) -> Option<&str> {
        match &self.kind {
            PanelKind::Drawing { drawing_id } => Some(drawing_id.as_str()),
        }
    }

    /// Returns `false` if the panel is already at (`x`, `y`).
    pub fn move_to(&mut self, x: f32, y: f32) -> bool {
        if self.x == x && self.y == y {
            return false;
        }
        self.x = x;
        self.y = y;
        true
    }

    pub fn translate(&mut self, dx: f32, dy: f32) -> bool {
        self.move_to(self.x + dx, self.y + dy)
    }
}

/// How far to move a panel in the z-stack. Positive offsets move it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOffset {
    By(isize),
    /// Topmost slot
    Front,
    Back,
}

impl ZOffset {
    /// Target index for a panel at `from` in a stack of `len` panels.
    pub fn target(self, from: usize, len: usize) -> usize {
        let top = len.saturating_sub(1);
        match self {
            ZOffset::Front => top,
            ZOffset::Back => 0,
            ZOffset::By(offset) => from.saturating_add_signed(offset).min(top),
        }
    }
}

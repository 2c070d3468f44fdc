use egui::{Pos2, Rect};

use super::RegionId;

/// Screen rectangles of the gesture regions, rebuilt every frame in paint
/// order. Later entries are on top.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    targets: Vec<(RegionId, Rect)>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Registers `region` as painted over everything inserted before it.
    pub fn insert(&mut self, region: RegionId, rect: Rect) {
        self.targets.push((region, rect));
    }

    /// The topmost region under `pos`. Children are inserted after their
    /// parents, so this is also the innermost one.
    pub fn target_at(&self, pos: Pos2) -> Option<RegionId> {
        self.targets
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(region, _)| *region)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Fallback when no window size is known yet, e.g. in tests.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1024.0;

/// Environment the reducer may read but never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandContext {
    /// Width of the workspace in points. New drawings are narrowed to fit.
    pub viewport_width: f32,
}

impl CommandContext {
    pub fn new(viewport_width: f32) -> Self {
        Self { viewport_width }
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH)
    }
}

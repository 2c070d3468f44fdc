use eframe::egui;

use crate::command::{Command, ImportedPixels};
use crate::document::DEFAULT_DRAWING_NAME;
use crate::raster;

/// Turns image files dropped on the window into `ImportDrawing` commands.
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects files dropped this frame. Returns true if there were any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files.extend(i.raw.dropped_files.iter().cloned());
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Decodes the collected files. Files that fail to load are logged and skipped.
    pub fn process_dropped_files(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter_map(|file| {
                let label = file_label(file);
                if !is_image_file(file) {
                    log::warn!("Dropped file is not a supported type: {label}");
                    return None;
                }
                let bytes = read_bytes(file, &label)?;
                match raster::decode_pixels(&bytes) {
                    Ok(pixels) => {
                        log::info!("Importing {label} as a drawing");
                        Some(Command::ImportDrawing {
                            name: drawing_name(file),
                            pixels: ImportedPixels(pixels),
                        })
                    }
                    Err(err) => {
                        log::error!("Failed to import {label}: {err}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Dims the window while files hover over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        let text = ctx.input(|i| {
            if i.raw.hovered_files.is_empty() {
                return None;
            }
            let mut text = "Drop images to import them:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => text += &format!("\n{}", path.display()),
                    None => text += "\n(Path not available)",
                }
            }
            Some(text)
        });
        let Some(text) = text else {
            return;
        };

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

/// Writes `drawing` as `<name>.png` into `dir` and returns the file path.
#[cfg(not(target_arch = "wasm32"))]
pub fn export_png(
    drawing: &crate::document::Drawing,
    dir: &std::path::Path,
    scale: u32,
) -> Result<std::path::PathBuf, raster::RasterError> {
    let file_name: String = drawing
        .name()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{file_name}.png"));
    std::fs::write(&path, raster::encode_png(drawing, scale)?)?;
    log::info!("Exported {}", path.display());
    Ok(path)
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let extension = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| {
            file.name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
        });
    matches!(
        extension.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn file_label(file: &egui::DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None if !file.name.is_empty() => file.name.clone(),
        None => "unknown".to_owned(),
    }
}

/// File stem, used as the new drawing's name.
fn drawing_name(file: &egui::DroppedFile) -> String {
    let stem = match &file.path {
        Some(path) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        None => file
            .name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_owned())
            .or_else(|| Some(file.name.clone())),
    };
    stem.filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DRAWING_NAME.to_owned())
}

fn read_bytes(file: &egui::DroppedFile, label: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }

    // For native platforms, we can load the file from the path
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return match std::fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    log::error!("Failed to read image file: {label}: {err}");
                    None
                }
            };
        }
    }

    log::warn!("Dropped file has no accessible data: {label}");
    None
}

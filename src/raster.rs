//! Conversion between drawings and RGBA rasters.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::color::Color;
use crate::document::{Drawing, MAX_PIXEL_SIZE};

/// Largest image, per side, that can be imported as a drawing.
pub const MAX_IMPORT_SIZE: u32 = 256;

// Pixels at least this opaque become filled cells
const OPAQUE_THRESHOLD: u8 = 128;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image is {width}x{height}, larger than {max}x{max}", max = MAX_IMPORT_SIZE)]
    TooLarge { width: u32, height: u32 },

    #[error("image has no pixels")]
    Empty,

    #[error("could not write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders each cell as a `scale` x `scale` block, with `scale` clamped to
/// the pixel size range. Empty cells are transparent.
pub fn to_rgba_image(drawing: &Drawing, scale: u32) -> RgbaImage {
    let scale = scale.clamp(1, MAX_PIXEL_SIZE);
    let rows: Vec<&[Option<Color>]> = drawing.rows().collect();
    let width = drawing.column_count() as u32 * scale;
    let height = drawing.row_count() as u32 * scale;

    RgbaImage::from_fn(width, height, |x, y| {
        let cell = rows[(y / scale) as usize][(x / scale) as usize];
        cell.map_or(Rgba([0, 0, 0, 0]), |color| Rgba(color.to_rgba8()))
    })
}

pub fn encode_png(drawing: &Drawing, scale: u32) -> Result<Vec<u8>, RasterError> {
    let mut bytes = Cursor::new(Vec::new());
    to_rgba_image(drawing, scale).write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Decodes any supported image format into drawing cells, one per pixel.
pub fn decode_pixels(bytes: &[u8]) -> Result<Vec<Vec<Option<Color>>>, RasterError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RasterError::Empty);
    }
    if width > MAX_IMPORT_SIZE || height > MAX_IMPORT_SIZE {
        return Err(RasterError::TooLarge { width, height });
    }

    Ok((0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
                    (a >= OPAQUE_THRESHOLD).then(|| Color::rgb(r, g, b))
                })
                .collect()
        })
        .collect())
}

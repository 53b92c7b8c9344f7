//! Square image transform.
//!
//! Rectangular images are made square either by padding the short axis with
//! black or by cropping the long axis. In both modes the source is centered,
//! with an offset of `floor(|w - h| / 2)` on the axis that changes.

use std::path::Path;

use image::{
    imageops, DynamicImage, ImageBuffer, ImageReader, Luma, LumaA, Pixel, Rgb, Rgba,
};
use serde::Serialize;

use crate::error::ImgsplitError;

/// How a rectangular image is made square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SquareMode {
    /// Center the image on a black `max(w, h)` canvas.
    #[default]
    Pad,
    /// Keep the centered `min(w, h)` square.
    Crop,
}

impl SquareMode {
    pub fn from_crop_flag(crop: bool) -> Self {
        if crop {
            SquareMode::Crop
        } else {
            SquareMode::Pad
        }
    }
}

/// Placement of the source relative to the square output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquareGeometry {
    /// Side of the output square.
    pub side: u32,
    /// Horizontal offset: into the canvas when padding, into the source when cropping.
    pub x: u32,
    /// Vertical offset, same convention as `x`.
    pub y: u32,
}

/// Compute the output geometry for a `width x height` source.
pub fn square_geometry(width: u32, height: u32, mode: SquareMode) -> SquareGeometry {
    let offset = width.abs_diff(height) / 2;
    let wide = width > height;

    match mode {
        SquareMode::Pad => SquareGeometry {
            side: width.max(height),
            x: if wide { 0 } else { offset },
            y: if wide { offset } else { 0 },
        },
        SquareMode::Crop => SquareGeometry {
            side: width.min(height),
            x: if wide { offset } else { 0 },
            y: if wide { 0 } else { offset },
        },
    }
}

/// Return a square version of `source`. Square inputs are returned unchanged.
///
/// The pixel format of the source is kept where possible; formats without a
/// direct-color representation here are materialized as RGBA8 first.
pub fn square_image(source: &DynamicImage, mode: SquareMode) -> DynamicImage {
    let (width, height) = (source.width(), source.height());
    if width == height {
        return source.clone();
    }

    let geometry = square_geometry(width, height, mode);
    match mode {
        SquareMode::Crop => source.crop_imm(geometry.x, geometry.y, geometry.side, geometry.side),
        SquareMode::Pad => pad_image(source, geometry),
    }
}

fn pad_image(source: &DynamicImage, g: SquareGeometry) -> DynamicImage {
    match source {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(pad(buf, g, Luma([0]))),
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(pad(buf, g, LumaA([0, u8::MAX])))
        }
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(pad(buf, g, Rgb([0, 0, 0]))),
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(pad(buf, g, Rgba([0, 0, 0, u8::MAX])))
        }
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(pad(buf, g, Luma([0]))),
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(pad(buf, g, LumaA([0, u16::MAX])))
        }
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(pad(buf, g, Rgb([0, 0, 0]))),
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba16(pad(buf, g, Rgba([0, 0, 0, u16::MAX])))
        }
        DynamicImage::ImageRgb32F(buf) => {
            DynamicImage::ImageRgb32F(pad(buf, g, Rgb([0.0, 0.0, 0.0])))
        }
        DynamicImage::ImageRgba32F(buf) => {
            DynamicImage::ImageRgba32F(pad(buf, g, Rgba([0.0, 0.0, 0.0, 1.0])))
        }
        other => {
            DynamicImage::ImageRgba8(pad(&other.to_rgba8(), g, Rgba([0, 0, 0, u8::MAX])))
        }
    }
}

fn pad<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    g: SquareGeometry,
    background: P,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut canvas = ImageBuffer::from_pixel(g.side, g.side, background);
    imageops::replace(&mut canvas, source, i64::from(g.x), i64::from(g.y));
    canvas
}

/// Load an image, detecting its format from content.
pub fn load_image(path: &Path) -> Result<DynamicImage, ImgsplitError> {
    let load_err = |source| ImgsplitError::ImageLoad {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(load_err)
}

/// Load `source`, square it and save it to `destination`.
///
/// The output format follows the destination extension. An existing file at
/// `destination` is overwritten.
pub fn square_file(source: &Path, destination: &Path, mode: SquareMode) -> Result<(), ImgsplitError> {
    let image = load_image(source)?;
    let squared = square_image(&image, mode);

    squared
        .save(destination)
        .map_err(|source| ImgsplitError::ImageSave {
            path: destination.to_path_buf(),
            source,
        })
}

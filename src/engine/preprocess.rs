//! # Stage Definition: Frame Preparation
//!
//! - **Inputs**: a validated [`ImageBuffer`] and the engine options.
//! - **Outputs**: [`PreparedFrame`] holding an upright luma frame cropped to
//!   the detection ROI, plus the offset needed to map boxes back.
//! - **Invariants**:
//!     - Row stride is honoured; padding bytes are never read as pixels.
//!     - The EXIF orientation is applied before the ROI, so the ROI is
//!       expressed in upright coordinates.
//!     - Planar YUV layouts contribute their luma plane only.

use crate::core::config::AlprConfig;
use crate::core::errors::{AlprError, AlprResult};
use crate::domain::image::{ExifOrientation, ImageBuffer, ImageType};
use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, Luma};

/// Upright, ROI-cropped frame ready for detection.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    /// Pixels handed to the detector.
    pub luma: GrayImage,
    /// Top-left corner of the ROI in upright frame coordinates.
    pub offset: (u32, u32),
    /// Upright frame size before cropping.
    pub full_size: (u32, u32),
}

impl PreparedFrame {
    /// Returns true when the ROI left nothing to look at.
    pub fn is_empty(&self) -> bool {
        self.luma.width() == 0 || self.luma.height() == 0
    }

    /// Maps a box from detector coordinates to upright frame coordinates.
    pub fn map_box(&self, warped_box: &[f32]) -> Vec<f32> {
        let (dx, dy) = (self.offset.0 as f32, self.offset.1 as f32);
        warped_box
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 2 == 0 { v + dx } else { v + dy })
            .collect()
    }
}

/// Validates `buffer` and turns it into an upright luma frame cropped to the
/// configured ROI.
pub fn prepare_frame(buffer: &ImageBuffer<'_>, config: &AlprConfig) -> AlprResult<PreparedFrame> {
    let orientation = buffer.validate()?;
    let stored = luma_from_buffer(buffer);
    let mut upright = apply_orientation(stored, orientation)?;

    if config.ienv_enabled {
        stretch_contrast(&mut upright);
    }

    let full_size = upright.dimensions();
    let Some((x, y, width, height)) = config.detect_roi.resolve(full_size.0, full_size.1) else {
        return Ok(PreparedFrame {
            luma: GrayImage::new(0, 0),
            offset: (0, 0),
            full_size,
        });
    };

    let luma = if (x, y, width, height) == (0, 0, full_size.0, full_size.1) {
        upright
    } else {
        image::imageops::crop_imm(&upright, x, y, width, height).to_image()
    };

    Ok(PreparedFrame {
        luma,
        offset: (x, y),
        full_size,
    })
}

/// Extracts luma from a buffer that has already been validated.
fn luma_from_buffer(buffer: &ImageBuffer<'_>) -> GrayImage {
    let data = buffer.data();
    let stride = buffer.effective_stride() as usize;

    let weighted = |r: u8, g: u8, b: u8| -> u8 {
        ((u32::from(r) * 77 + u32::from(g) * 150 + u32::from(b) * 29) >> 8) as u8
    };

    GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        let value = match buffer.image_type() {
            ImageType::Rgb24 => {
                let i = (y * stride + x) * 3;
                weighted(data[i], data[i + 1], data[i + 2])
            }
            ImageType::Bgr24 => {
                let i = (y * stride + x) * 3;
                weighted(data[i + 2], data[i + 1], data[i])
            }
            ImageType::Rgba32 => {
                let i = (y * stride + x) * 4;
                weighted(data[i], data[i + 1], data[i + 2])
            }
            ImageType::Bgra32 => {
                let i = (y * stride + x) * 4;
                weighted(data[i + 2], data[i + 1], data[i])
            }
            // Y plane comes first in every planar layout.
            ImageType::Y
            | ImageType::Nv12
            | ImageType::Nv21
            | ImageType::Yuv420p
            | ImageType::Yvu420p
            | ImageType::Yuv422p
            | ImageType::Yuv444p => data[y * stride + x],
        };
        Luma([value])
    })
}

fn apply_orientation(frame: GrayImage, orientation: ExifOrientation) -> AlprResult<GrayImage> {
    if orientation == ExifOrientation::UPRIGHT {
        return Ok(frame);
    }
    let transform = Orientation::from_exif(orientation.value()).ok_or_else(|| {
        AlprError::InvalidOrientation {
            value: i32::from(orientation.value()),
        }
    })?;

    let mut image = DynamicImage::ImageLuma8(frame);
    image.apply_orientation(transform);
    Ok(image.into_luma8())
}

/// Linear min/max stretch used for night vision enhancement.
fn stretch_contrast(frame: &mut GrayImage) {
    let (min, max) = frame
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if max <= min || (min == 0 && max == u8::MAX) {
        return;
    }

    let range = u32::from(max - min);
    for pixel in frame.pixels_mut() {
        pixel[0] = (u32::from(pixel[0] - min) * 255 / range) as u8;
    }
}

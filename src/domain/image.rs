//! Image buffers handed to the engine.
//!
//! An [`ImageBuffer`] borrows raw pixel bytes owned by the caller and
//! describes their layout: pixel type, dimensions, row stride and the EXIF
//! orientation that must be applied before recognition. The engine reads the
//! bytes only for the duration of one `process` call.

use crate::core::errors::{AlprError, AlprResult};
use std::fmt;

/// Pixel layouts accepted by the engine.
///
/// Packed types store all channels of a pixel together. The YUV variants are
/// planar: a full-resolution luma plane followed by chroma planes (`Nv12` and
/// `Nv21` interleave the two chroma channels in a single plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Rgb24,
    Rgba32,
    Bgra32,
    Bgr24,
    /// Single-channel luma (grayscale).
    Y,
    Nv12,
    Nv21,
    Yuv420p,
    Yvu420p,
    Yuv422p,
    Yuv444p,
}

impl ImageType {
    /// Every supported image type.
    pub const ALL: [ImageType; 11] = [
        ImageType::Rgb24,
        ImageType::Rgba32,
        ImageType::Bgra32,
        ImageType::Bgr24,
        ImageType::Y,
        ImageType::Nv12,
        ImageType::Nv21,
        ImageType::Yuv420p,
        ImageType::Yvu420p,
        ImageType::Yuv422p,
        ImageType::Yuv444p,
    ];

    /// Returns the conventional name of the layout.
    pub fn name(&self) -> &'static str {
        match self {
            ImageType::Rgb24 => "RGB24",
            ImageType::Rgba32 => "RGBA32",
            ImageType::Bgra32 => "BGRA32",
            ImageType::Bgr24 => "BGR24",
            ImageType::Y => "Y",
            ImageType::Nv12 => "NV12",
            ImageType::Nv21 => "NV21",
            ImageType::Yuv420p => "YUV420P",
            ImageType::Yvu420p => "YVU420P",
            ImageType::Yuv422p => "YUV422P",
            ImageType::Yuv444p => "YUV444P",
        }
    }

    /// Bytes per pixel for packed layouts, `None` for the planar YUV family.
    ///
    /// `Y` is reported as a one byte packed layout.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            ImageType::Rgb24 | ImageType::Bgr24 => Some(3),
            ImageType::Rgba32 | ImageType::Bgra32 => Some(4),
            ImageType::Y => Some(1),
            _ => None,
        }
    }

    /// Returns true for layouts carrying a separate luma plane.
    pub fn is_planar(&self) -> bool {
        self.bytes_per_pixel().is_none()
    }

    /// Computes the exact byte length of a buffer of this type.
    ///
    /// `stride` is expressed in samples per row of the first plane; `0`
    /// means tightly packed (`stride == width`). Chroma planes of subsampled
    /// layouts use `ceil(stride / 2)` samples per row. Returns `None` when
    /// the size does not fit in `usize`.
    pub fn required_len(&self, width: u32, height: u32, stride: u32) -> Option<usize> {
        let stride = if stride == 0 { width } else { stride } as usize;
        let height = height as usize;
        let luma = stride.checked_mul(height)?;

        if let Some(bpp) = self.bytes_per_pixel() {
            return luma.checked_mul(bpp);
        }

        let half_stride = stride.div_ceil(2);
        let half_height = height.div_ceil(2);
        let chroma = match self {
            ImageType::Nv12 | ImageType::Nv21 | ImageType::Yuv420p | ImageType::Yvu420p => {
                half_stride.checked_mul(half_height)?.checked_mul(2)?
            }
            ImageType::Yuv422p => half_stride.checked_mul(height)?.checked_mul(2)?,
            ImageType::Yuv444p => luma.checked_mul(2)?,
            _ => 0,
        };
        luma.checked_add(chroma)
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// EXIF orientation tag value (1..=8).
///
/// `1` is upright. `2`..`8` describe the rotation and/or mirroring that
/// turns the stored pixels into an upright frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExifOrientation(u8);

impl ExifOrientation {
    /// Upright orientation.
    pub const UPRIGHT: ExifOrientation = ExifOrientation(1);

    /// Wraps a raw tag value, rejecting anything outside 1..=8.
    pub fn new(value: i32) -> AlprResult<Self> {
        match value {
            1..=8 => Ok(Self(value as u8)),
            _ => Err(AlprError::InvalidOrientation { value }),
        }
    }

    /// Returns the raw tag value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true when width and height are swapped once upright.
    pub fn swaps_dimensions(&self) -> bool {
        self.0 >= 5
    }
}

impl Default for ExifOrientation {
    fn default() -> Self {
        Self::UPRIGHT
    }
}

/// Borrowed pixel buffer plus its layout.
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer<'a> {
    image_type: ImageType,
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: u32,
    orientation: i32,
}

impl<'a> ImageBuffer<'a> {
    /// Creates a tightly packed, upright buffer.
    pub fn new(image_type: ImageType, data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            image_type,
            data,
            width,
            height,
            stride: 0,
            orientation: 1,
        }
    }

    /// Sets the row stride in samples (`0` = width).
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Sets the raw EXIF orientation value.
    ///
    /// The value is stored unchecked; [`ImageBuffer::validate`] rejects
    /// anything outside 1..=8.
    pub fn with_orientation(mut self, orientation: i32) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride as supplied (`0` = width).
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Row stride in samples with `0` resolved to the width.
    pub fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width
        } else {
            self.stride
        }
    }

    /// Raw orientation value as supplied.
    pub fn orientation(&self) -> i32 {
        self.orientation
    }

    /// Checks dimensions, stride, byte length and orientation.
    pub fn validate(&self) -> AlprResult<ExifOrientation> {
        if self.width == 0 || self.height == 0 {
            return Err(AlprError::invalid_input(format!(
                "image dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.stride != 0 && self.stride < self.width {
            return Err(AlprError::invalid_input(format!(
                "stride {} is smaller than width {}",
                self.stride, self.width
            )));
        }

        let expected = self
            .image_type
            .required_len(self.width, self.height, self.stride)
            .ok_or_else(|| {
                AlprError::invalid_input(format!(
                    "{} buffer of {}x{} (stride {}) overflows",
                    self.image_type, self.width, self.height, self.stride
                ))
            })?;
        if self.data.len() != expected {
            return Err(AlprError::BufferSizeMismatch {
                expected,
                actual: self.data.len(),
            });
        }

        ExifOrientation::new(self.orientation)
    }
}

/// Decoded image owned by the caller, ready to be lent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub image_type: ImageType,
    pub orientation: ExifOrientation,
}

impl OwnedImage {
    /// Borrows the pixels as a tightly packed [`ImageBuffer`].
    pub fn as_buffer(&self) -> ImageBuffer<'_> {
        ImageBuffer::new(self.image_type, &self.data, self.width, self.height)
            .with_orientation(i32::from(self.orientation.value()))
    }

    /// Same as [`OwnedImage::as_buffer`] but with orientation forced upright.
    pub fn as_upright_buffer(&self) -> ImageBuffer<'_> {
        ImageBuffer::new(self.image_type, &self.data, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_len() {
        assert_eq!(ImageType::Rgb24.required_len(1280, 720, 0), Some(1280 * 720 * 3));
        assert_eq!(ImageType::Bgra32.required_len(10, 10, 16), Some(16 * 10 * 4));
        assert_eq!(ImageType::Y.required_len(7, 3, 0), Some(21));
        // 5x3 luma, 3x2 interleaved chroma pairs
        assert_eq!(ImageType::Nv12.required_len(5, 3, 0), Some(15 + 12));
        assert_eq!(ImageType::Yuv420p.required_len(4, 4, 0), Some(16 + 8));
        assert_eq!(ImageType::Yuv422p.required_len(4, 4, 0), Some(16 + 16));
        assert_eq!(ImageType::Yuv444p.required_len(4, 4, 0), Some(48));
        assert_eq!(ImageType::Rgba32.required_len(u32::MAX, u32::MAX, 0), None);
    }

    #[test]
    fn test_validate_size_mismatch() {
        let data = vec![0u8; 100];
        let err = ImageBuffer::new(ImageType::Rgb24, &data, 10, 10)
            .validate()
            .unwrap_err();
        match err {
            AlprError::BufferSizeMismatch { expected, actual } => {
                assert_eq!(expected, 300);
                assert_eq!(actual, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_stride_and_dimensions() {
        let data = vec![0u8; 12 * 4 * 3];
        assert!(ImageBuffer::new(ImageType::Rgb24, &data, 10, 4)
            .with_stride(12)
            .validate()
            .is_ok());
        assert!(matches!(
            ImageBuffer::new(ImageType::Rgb24, &data, 10, 4)
                .with_stride(8)
                .validate(),
            Err(AlprError::InvalidInput { .. })
        ));
        assert!(matches!(
            ImageBuffer::new(ImageType::Rgb24, &[], 0, 4).validate(),
            Err(AlprError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_orientation_range() {
        let data = vec![0u8; 4];
        for value in 1..=8 {
            let orientation = ImageBuffer::new(ImageType::Y, &data, 2, 2)
                .with_orientation(value)
                .validate()
                .unwrap();
            assert_eq!(i32::from(orientation.value()), value);
        }
        for value in [0, 9, -1] {
            assert!(matches!(
                ImageBuffer::new(ImageType::Y, &data, 2, 2)
                    .with_orientation(value)
                    .validate(),
                Err(AlprError::InvalidOrientation { value: v }) if v == value
            ));
        }
        assert!(ExifOrientation::new(6).unwrap().swaps_dimensions());
        assert!(!ExifOrientation::new(3).unwrap().swaps_dimensions());
    }
}

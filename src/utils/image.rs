//! Image file loading.
//!
//! Files are decoded with the `image` crate. Pixels are kept in their stored
//! orientation; the EXIF orientation found in the file travels alongside
//! them so the engine can apply it.

use crate::core::errors::{AlprError, AlprResult};
use crate::domain::image::{ExifOrientation, ImageType, OwnedImage};
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Loads and decodes an image file.
///
/// # Errors
///
/// * [`AlprError::ImageNotFound`] when `path` is not a file
/// * [`AlprError::ImageLoad`] when decoding fails
/// * [`AlprError::UnsupportedPixelMode`] for anything other than RGB, RGBA
///   or 8-bit grayscale
pub fn load_image(path: impl AsRef<Path>) -> AlprResult<OwnedImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AlprError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let image = DynamicImage::from_decoder(decoder)?;
    let orientation = ExifOrientation::new(i32::from(orientation.to_exif()))?;

    debug!(
        "decoded {} ({}x{}, {:?}, orientation {})",
        path.display(),
        image.width(),
        image.height(),
        image.color(),
        orientation.value()
    );
    owned_from_dynamic(image, orientation)
}

/// Reads the EXIF orientation of an encoded image (JPEG, PNG, TIFF, WebP).
///
/// Images without orientation metadata are upright.
pub fn read_orientation(encoded: &[u8]) -> AlprResult<ExifOrientation> {
    let mut decoder = ImageReader::new(Cursor::new(encoded))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    ExifOrientation::new(i32::from(orientation.to_exif()))
}

/// Converts a decoded image into engine-ready bytes.
///
/// RGB maps to [`ImageType::Rgb24`], RGBA to [`ImageType::Rgba32`] and
/// 8-bit luma to [`ImageType::Y`].
pub fn owned_from_dynamic(
    image: DynamicImage,
    orientation: ExifOrientation,
) -> AlprResult<OwnedImage> {
    let (width, height) = (image.width(), image.height());
    let (image_type, data) = match image {
        DynamicImage::ImageRgb8(buffer) => (ImageType::Rgb24, buffer.into_raw()),
        DynamicImage::ImageRgba8(buffer) => (ImageType::Rgba32, buffer.into_raw()),
        DynamicImage::ImageLuma8(buffer) => (ImageType::Y, buffer.into_raw()),
        other => {
            return Err(AlprError::UnsupportedPixelMode {
                mode: format!("{:?}", other.color()),
            });
        }
    };

    Ok(OwnedImage {
        data,
        width,
        height,
        image_type,
        orientation,
    })
}

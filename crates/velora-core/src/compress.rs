//! Image compression ahead of asset-host upload.
//!
//! Shrinks an image into a use-case envelope (max bytes / max dimension /
//! output format). Compression failure is never an error: the caller gets
//! the original file back unchanged and the failure is only logged, so a
//! bad input can never block an upload.

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, GenericImageView, ImageFormat};

use crate::error::{Error, Result};

/// Output format for compressed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressedFormat {
    Jpeg,
    Png,
    WebP,
}

impl CompressedFormat {
    const fn as_image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// File extension for the output format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// MIME type for the output format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }
}

/// Target envelope for one compression pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Target output size in bytes. Only enforceable for JPEG output,
    /// where quality can be walked down; other formats may overshoot.
    pub max_bytes: u64,
    /// Maximum width or height in pixels (aspect ratio preserved, no
    /// upscaling).
    pub max_dimension: u32,
    /// Output image format.
    pub format: CompressedFormat,
    /// Starting JPEG quality (ignored for other formats).
    pub initial_quality: u8,
}

/// Per-use-case compression presets.
///
/// Covers allow the largest envelope, avatars a mid-size one, gallery
/// thumbnails the smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionProfile {
    Cover,
    Avatar,
    Gallery,
}

impl CompressionProfile {
    #[must_use]
    pub const fn options(self) -> CompressionOptions {
        match self {
            Self::Cover => CompressionOptions {
                max_bytes: 4 * 1024 * 1024,
                max_dimension: 3840,
                format: CompressedFormat::Jpeg,
                initial_quality: 90,
            },
            Self::Avatar => CompressionOptions {
                max_bytes: 1024 * 1024,
                max_dimension: 1200,
                format: CompressedFormat::Jpeg,
                initial_quality: 85,
            },
            Self::Gallery => CompressionOptions {
                max_bytes: 512 * 1024,
                max_dimension: 1024,
                format: CompressedFormat::Jpeg,
                initial_quality: 80,
            },
        }
    }
}

/// An image file as plain data: bytes plus the metadata the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

const QUALITY_FLOOR: u8 = 30;
const QUALITY_STEP: u8 = 10;

/// Compress an image into the target envelope.
///
/// On any decode or encode failure the original file is returned unchanged
/// and the failure is logged at `warn`. On success the file name extension
/// and content type are rewritten to the output format.
#[must_use]
pub fn compress_image(file: ImageFile, options: CompressionOptions) -> ImageFile {
    match try_compress(&file, options) {
        Ok(compressed) => compressed,
        Err(error) => {
            tracing::warn!(
                file_name = %file.file_name,
                %error,
                "Image compression failed, using original file"
            );
            file
        }
    }
}

fn try_compress(file: &ImageFile, options: CompressionOptions) -> Result<ImageFile> {
    if file.bytes.is_empty() {
        return Err(Error::InvalidInput(
            "Compression source bytes cannot be empty".to_string(),
        ));
    }
    if options.max_dimension == 0 {
        return Err(Error::InvalidInput(
            "Compression max dimension must be greater than zero".to_string(),
        ));
    }

    let source = image::load_from_memory(&file.bytes).map_err(|error| {
        Error::InvalidInput(format!("Failed to decode source image: {error}"))
    })?;

    let (width, height) = source.dimensions();
    let resized = if width <= options.max_dimension && height <= options.max_dimension {
        source
    } else {
        source.thumbnail(options.max_dimension, options.max_dimension)
    };

    let bytes = encode_to_envelope(&resized, options)?;

    Ok(ImageFile {
        file_name: rename_for_format(&file.file_name, options.format),
        content_type: options.format.content_type().to_string(),
        bytes,
    })
}

fn encode_to_envelope(
    image: &image::DynamicImage,
    options: CompressionOptions,
) -> Result<Vec<u8>> {
    match options.format {
        CompressedFormat::Jpeg => {
            let mut quality = options.initial_quality.clamp(QUALITY_FLOOR, 100);
            loop {
                let bytes = encode_jpeg(image, quality)?;
                if bytes.len() as u64 <= options.max_bytes || quality <= QUALITY_FLOOR {
                    return Ok(bytes);
                }
                quality = quality.saturating_sub(QUALITY_STEP).max(QUALITY_FLOOR);
            }
        }
        CompressedFormat::Png | CompressedFormat::WebP => {
            let mut cursor = Cursor::new(Vec::new());
            image
                .write_to(&mut cursor, options.format.as_image_format())
                .map_err(|error| {
                    Error::InvalidInput(format!("Failed to encode image: {error}"))
                })?;
            Ok(cursor.into_inner())
        }
    }
}

fn encode_jpeg(image: &image::DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode_image(image)
        .map_err(|error| Error::InvalidInput(format!("Failed to encode JPEG: {error}")))?;
    Ok(cursor.into_inner())
}

/// Rewrite a file name's extension to the output format, keeping the stem.
fn rename_for_format(file_name: &str, format: CompressedFormat) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _ext)| stem);
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// Deterministic noise image: hard to compress, exercises the quality
    /// walk-down.
    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut state: u32 = 0x1234_5678;
        let image = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(width, height, |_x, _y| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let bytes = state.to_le_bytes();
            Rgb([bytes[0], bytes[1], bytes[2]])
        });

        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    fn source_file(width: u32, height: u32) -> ImageFile {
        ImageFile {
            file_name: "source.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: noise_png(width, height),
        }
    }

    #[test]
    fn undecodable_input_falls_back_to_original_bytes() {
        let original = ImageFile {
            file_name: "broken.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: b"not-an-image".to_vec(),
        };

        let result = compress_image(original.clone(), CompressionProfile::Cover.options());
        assert_eq!(result, original);
    }

    #[test]
    fn empty_input_falls_back_to_original() {
        let original = ImageFile {
            file_name: "empty.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Vec::new(),
        };

        let result = compress_image(original.clone(), CompressionProfile::Gallery.options());
        assert_eq!(result, original);
    }

    #[test]
    fn large_image_fits_the_envelope() {
        let options = CompressionOptions {
            max_bytes: 2 * 1024 * 1024,
            max_dimension: 1600,
            format: CompressedFormat::Jpeg,
            initial_quality: 90,
        };

        let result = compress_image(source_file(2400, 1800), options);

        let decoded = image::load_from_memory(&result.bytes).unwrap();
        let (width, height) = decoded.dimensions();
        assert!(width.max(height) <= 1600);
        // Allow modest overshoot; the quality walk-down stops at a floor.
        assert!(result.bytes.len() as u64 <= options.max_bytes + options.max_bytes / 10);
        assert_eq!(result.file_name, "source.jpg");
        assert_eq!(result.content_type, "image/jpeg");
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let result = compress_image(source_file(320, 200), CompressionProfile::Cover.options());

        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (320, 200));
    }

    #[test]
    fn profiles_shrink_in_order() {
        let cover = CompressionProfile::Cover.options();
        let avatar = CompressionProfile::Avatar.options();
        let gallery = CompressionProfile::Gallery.options();

        assert!(cover.max_bytes > avatar.max_bytes);
        assert!(avatar.max_bytes > gallery.max_bytes);
        assert!(cover.max_dimension > avatar.max_dimension);
        assert!(avatar.max_dimension > gallery.max_dimension);
    }

    #[test]
    fn rename_replaces_extension_and_handles_missing_stem() {
        assert_eq!(
            rename_for_format("photo.png", CompressedFormat::Jpeg),
            "photo.jpg"
        );
        assert_eq!(
            rename_for_format("photo", CompressedFormat::WebP),
            "photo.webp"
        );
        assert_eq!(
            rename_for_format(".png", CompressedFormat::Jpeg),
            "image.jpg"
        );
    }
}

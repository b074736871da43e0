//! Project photo upload rules: accepted formats, size limits, dimension probe.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::CoreError;

/// Default per-file upload limit (10 MiB). Overridable via config.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub const MAX_CAPTION_LENGTH: usize = 500;

/// Lower-cased extension of `file_name`, if it is one we accept.
pub fn allowed_extension(file_name: &str) -> Result<String, CoreError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image type '{file_name}'. Allowed extensions: {ALLOWED_EXTENSIONS:?}"
        )))
    }
}

/// MIME type served for a stored extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn validate_size(len: usize, max_bytes: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Uploaded image is empty".into()));
    }
    if len > max_bytes {
        return Err(CoreError::Validation(format!(
            "Image is {len} bytes; the maximum is {max_bytes} bytes"
        )));
    }
    Ok(())
}

pub fn validate_caption(caption: &str) -> Result<(), CoreError> {
    if caption.chars().count() > MAX_CAPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Caption exceeds {MAX_CAPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Width and height read from the image header, plus the sniffed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Sniff the format from the bytes and read the dimensions without decoding
/// pixel data. The sniffed format must agree with the file extension.
pub fn probe(bytes: &[u8], ext: &str) -> Result<ImageInfo, CoreError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| CoreError::Validation("File is not a recognised image".into()))?;

    let expected = match ext {
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::WebP,
        other => {
            return Err(CoreError::Validation(format!(
                "Unsupported image extension '{other}'"
            )))
        }
    };
    if format != expected {
        return Err(CoreError::Validation(format!(
            "File content is {format:?} but the extension is '.{ext}'"
        )));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Could not read image dimensions: {e}")))?;
    Ok(ImageInfo {
        width,
        height,
        format,
    })
}

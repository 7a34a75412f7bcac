//! Image validation
//!
//! Size and type checks on a candidate image before submission. A rejected
//! candidate never becomes the current SelectedImage.

use std::io::Cursor;

use chrono::Utc;

use crate::models::{ImageSource, SelectedImage};

use super::error::AnalysisError;

/// Maximum accepted image size (10 MB)
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Validate a candidate image and build the SelectedImage on success
///
/// The MIME type is detected from content, not the file name. Pixel
/// dimensions are best-effort preview metadata and never cause rejection.
pub fn validate_image(
    bytes: Vec<u8>,
    file_name: &str,
    source: ImageSource,
) -> Result<SelectedImage, AnalysisError> {
    let size_bytes = bytes.len() as u64;
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(AnalysisError::Validation(
            "File size too large. Please select an image under 10MB.".to_string(),
        ));
    }

    let format = image::guess_format(&bytes).map_err(|_| {
        AnalysisError::Validation("Please select a valid image file.".to_string())
    })?;
    let mime = format.to_mime_type();
    if !mime.starts_with("image/") {
        return Err(AnalysisError::Validation(
            "Please select a valid image file.".to_string(),
        ));
    }

    let dimensions = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    Ok(SelectedImage {
        bytes,
        file_name: file_name.to_string(),
        mime: mime.to_string(),
        size_bytes,
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
        source,
        selected_at: Utc::now(),
    })
}

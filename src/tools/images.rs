//! Image acquisition tools
//!
//! File selection and camera capture, both funneled through validation
//! before becoming the current selection.

use std::path::Path;

use serde::Serialize;

use crate::analysis::validate::validate_image;
use crate::analysis::workflow::MealAnalyzer;
use crate::capture::{CameraCapture, Facing};
use crate::models::{ImageSource, SelectedImage};

use super::status::StatusTracker;

/// Response for select_image and capture_photo
#[derive(Debug, Serialize)]
pub struct SelectImageResponse {
    pub file_name: String,
    pub mime: String,
    pub size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub source: &'static str,
}

impl From<&SelectedImage> for SelectImageResponse {
    fn from(image: &SelectedImage) -> Self {
        Self {
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            size_bytes: image.size_bytes,
            width: image.width,
            height: image.height,
            source: image.source.as_str(),
        }
    }
}

/// Select an image file as the current photo
pub async fn select_image(
    analyzer: &mut MealAnalyzer,
    tracker: &mut StatusTracker,
    path: &str,
) -> Result<SelectImageResponse, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path, e))?;

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let selected = validate_image(bytes, &file_name, ImageSource::Upload)
        .map_err(|e| e.to_string())?;
    tracker.record_image_selected(&selected);

    Ok(SelectImageResponse::from(analyzer.select(selected)))
}

/// Capture a photo with the configured camera command
pub fn capture_photo(
    analyzer: &mut MealAnalyzer,
    tracker: &mut StatusTracker,
    camera: &CameraCapture,
    facing: Facing,
) -> Result<SelectImageResponse, String> {
    let bytes = camera.capture(facing).map_err(|e| e.to_string())?;

    let selected = validate_image(bytes, "camera-photo.jpg", ImageSource::Camera)
        .map_err(|e| e.to_string())?;
    tracker.record_photo_captured();
    tracker.record_image_selected(&selected);

    Ok(SelectImageResponse::from(analyzer.select(selected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::workflow::RetryPolicy;
    use std::io::{Cursor, Write};
    use std::path::PathBuf;
    use std::time::Duration;

    fn fixtures() -> (MealAnalyzer, StatusTracker) {
        (
            MealAnalyzer::new(RetryPolicy {
                retry_delay: Duration::ZERO,
            }),
            StatusTracker::new(PathBuf::from("/tmp/mealsnap.json")),
        )
    }

    fn png_file() -> tempfile::NamedTempFile {
        let img = image::RgbImage::new(2, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&buf.into_inner()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_select_image_from_file() {
        let (mut analyzer, mut tracker) = fixtures();
        let file = png_file();

        let response = select_image(
            &mut analyzer,
            &mut tracker,
            &file.path().display().to_string(),
        )
        .await
        .unwrap();

        assert_eq!(response.mime, "image/png");
        assert_eq!(response.source, "web_upload");
        assert!(analyzer.selected().is_some());
        assert_eq!(tracker.stats().images_selected, 1);
    }

    #[tokio::test]
    async fn test_invalid_file_leaves_selection_unchanged() {
        let (mut analyzer, mut tracker) = fixtures();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not an image at all").unwrap();

        let err = select_image(
            &mut analyzer,
            &mut tracker,
            &file.path().display().to_string(),
        )
        .await
        .unwrap_err();

        assert!(err.contains("valid image"));
        assert!(analyzer.selected().is_none());
        assert_eq!(tracker.stats().images_selected, 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let (mut analyzer, mut tracker) = fixtures();
        let err = select_image(&mut analyzer, &mut tracker, "/no/such/photo.png")
            .await
            .unwrap_err();
        assert!(err.contains("/no/such/photo.png"));
    }

    #[test]
    fn test_capture_photo_without_camera_gives_guidance() {
        let (mut analyzer, mut tracker) = fixtures();
        let camera = CameraCapture::new(None);
        let err =
            capture_photo(&mut analyzer, &mut tracker, &camera, Facing::Environment).unwrap_err();
        assert!(err.contains("select_image"));
        assert_eq!(tracker.stats().photos_captured, 0);
    }

    #[test]
    fn test_capture_photo_with_copy_command() {
        let (mut analyzer, mut tracker) = fixtures();
        let file = png_file();
        let camera = CameraCapture::new(Some(format!(
            "cp {} {{output}}",
            file.path().display()
        )));

        let response =
            capture_photo(&mut analyzer, &mut tracker, &camera, Facing::Environment).unwrap();
        assert_eq!(response.source, "camera_capture");
        assert_eq!(response.file_name, "camera-photo.jpg");
        assert_eq!(tracker.stats().photos_captured, 1);
    }
}

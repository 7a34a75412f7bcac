//! Selected image model
//!
//! The owned image blob plus metadata, exclusively owned by the workflow
//! controller and replaced whenever the user picks or captures a new photo.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How the current image was acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Upload,
    Camera,
}

impl ImageSource {
    /// Wire value for the multipart `source` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Upload => "web_upload",
            ImageSource::Camera => "camera_capture",
        }
    }
}

/// The currently selected image and its preview metadata
#[derive(Debug, Clone)]
pub struct SelectedImage {
    /// Raw image bytes, sent as the multipart `image` part
    pub bytes: Vec<u8>,
    pub file_name: String,
    /// Content-detected MIME type, always `image/*`
    pub mime: String,
    pub size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub source: ImageSource,
    pub selected_at: DateTime<Utc>,
}

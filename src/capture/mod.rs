//! Camera capture
//!
//! Capture is delegated to a configurable external command (for example
//! `imagesnap -q {output}` or `rpicam-still -o {output}`). A capture session
//! owns a temp output path for the duration of one shot; the file is removed
//! on every path. Failures map to user-facing guidance that always points at
//! file selection as the fallback.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::debug;

/// Camera error types, each carrying its own guidance text
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera access failed. Please allow camera permissions and try again.")]
    PermissionDenied,

    #[error("Camera access failed. No camera found on this device.")]
    DeviceNotFound,

    #[error("No capture command configured. Use select_image to choose a photo file instead.")]
    NotConfigured,

    #[error("Camera capture failed: {0}. Please try the file upload option instead.")]
    Failed(String),
}

/// Which camera to use; maps to the `{facing}` command placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Back camera
    #[default]
    Environment,
    /// Front camera
    User,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Environment => "environment",
            Facing::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "user" | "front" => Facing::User,
            _ => Facing::Environment,
        }
    }
}

/// External-command camera backend
#[derive(Debug, Clone, Default)]
pub struct CameraCapture {
    command: Option<String>,
}

impl CameraCapture {
    /// `command` is a template with `{output}` (required) and `{facing}`
    /// (optional) placeholders
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    /// Take one photo, returning the captured bytes
    pub fn capture(&self, facing: Facing) -> Result<Vec<u8>, CameraError> {
        let template = self.command.as_deref().ok_or(CameraError::NotConfigured)?;
        let session = CaptureSession::acquire();

        let rendered = template
            .replace("{output}", &session.path().display().to_string())
            .replace("{facing}", facing.as_str());
        let mut parts = rendered.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CameraError::Failed("empty capture command".to_string()))?;

        debug!(command = %rendered, facing = facing.as_str(), "running capture command");

        let output = Command::new(program)
            .args(parts)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
                std::io::ErrorKind::NotFound => {
                    CameraError::Failed(format!("capture command not found: {}", program))
                }
                _ => CameraError::Failed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        std::fs::read(session.path())
            .map_err(|e| CameraError::Failed(format!("no captured image: {}", e)))
    }
}

/// Map a nonzero capture exit to a guidance-bearing error
fn classify_failure(stderr: &str) -> CameraError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") {
        CameraError::PermissionDenied
    } else if lowered.contains("no such device")
        || lowered.contains("no camera")
        || lowered.contains("device not found")
    {
        CameraError::DeviceNotFound
    } else {
        let detail = stderr.trim();
        if detail.is_empty() {
            CameraError::Failed("capture command exited with an error".to_string())
        } else {
            CameraError::Failed(detail.to_string())
        }
    }
}

/// Monotonic counter keeping concurrent session paths distinct
static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The acquire/release pair around one capture: a unique temp output path,
/// removed on drop
struct CaptureSession {
    path: PathBuf,
}

impl CaptureSession {
    fn acquire() -> Self {
        let n = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "mealsnap-capture-{}-{}.jpg",
            std::process::id(),
            n
        ));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

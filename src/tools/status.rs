//! MealSnap status tool
//!
//! Runtime status of the service plus per-session usage tracking: counters
//! for the workflow steps and a bounded in-memory event ring.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::debug;

use crate::build_info::BuildInfo;
use crate::models::{ResultOrigin, SelectedImage};

/// Workflow instructions for AI assistants
pub const ANALYSIS_INSTRUCTIONS: &str = r#"
# MealSnap Analysis Instructions

This guide explains how to analyze a meal photo using the MealSnap tools.

## Overview

One analysis cycle has three steps:
1. **Select an image** - a photo file (`select_image`) or a camera shot
   (`capture_photo`)
2. **Analyze** - `analyze_meal` sends the photo to the nutrition webhook
3. **Read the results** - the analysis reply (or `show_results` later)
   contains the macro totals and the detected food items

## Selecting an Image

**Tool:** `select_image`
- `path` - path to an image file on disk
- The file must be a real image under 10 MB; the type is detected from the
  file content, not the extension
- Selecting a new image replaces the previous one

**Tool:** `capture_photo`
- Uses the capture command from the configuration (`camera_command`)
- `facing` - "environment" (back camera, default) or "user" (front camera)
- If no capture command is configured or the camera fails, fall back to
  `select_image` with a file path

## Analyzing

**Tool:** `analyze_meal`
- Sends the selected image to the configured analysis endpoint
- Only one analysis runs at a time; a second call while one is in flight
  is answered with an "already in progress" message and does nothing
- On a connection failure the request is retried once automatically after
  a short delay

### Sample results

If the analysis service cannot be reached or returns an unusable response,
the reply contains a locally generated **sample result** instead of real
data. Sample replies always carry:
- `origin.kind` = "sample" with the sample meal name
- an `advisory` explaining why real data was unavailable

Tell the user when results are samples. Numbers in a sample are plausible
but fabricated.

## Reading Results

- Totals: protein/carbs/fat in grams (one decimal place), calories in kcal
- `food` lists the detected items in detection order
- `show_results` re-renders the last outcome without a new request
- `reset_analyzer` clears the selected image and results

## Configuration

**Tool:** `configure_provider`
- `provider` - one of: openai, google, clarifai, n8n, nutritionix
- openai/google/clarifai need `api_key`; n8n needs `endpoint`;
  nutritionix needs `api_key` and `app_id`
- Saved configuration is reloaded automatically on the next start

**Tool:** `test_provider` - connectivity check for a configured provider.

**Tool:** `list_providers` - which providers are configured (keys masked).

**Tool:** `mealsnap_status` - build info, session statistics, process info.
"#;

/// Cap on the in-memory event ring
const MAX_TRACKED_EVENTS: usize = 100;

/// Per-session workflow counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionStats {
    pub images_selected: u64,
    pub photos_captured: u64,
    pub analyses_requested: u64,
    pub real_results_shown: u64,
    pub sample_results_shown: u64,
}

/// One tracked session event
#[derive(Debug, Clone, Serialize)]
pub struct TrackedEvent {
    pub name: String,
    pub timestamp: String,
    pub data: Value,
}

/// Runtime status of the MealSnap service
#[derive(Debug, Clone, Serialize)]
pub struct MealSnapStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Configuration information
    pub config_path: String,
    pub config_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// Session information
    pub session_id: String,
    pub stats: SessionStats,
    pub tracked_events: usize,
}

/// Status tracker for runtime information and session statistics
pub struct StatusTracker {
    start_time: Instant,
    session_id: String,
    config_path: PathBuf,
    stats: SessionStats,
    events: VecDeque<TrackedEvent>,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            session_id: generate_session_id(),
            config_path,
            stats: SessionStats::default(),
            events: VecDeque::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Record a session event, keeping only the most recent ones
    pub fn track_event(&mut self, name: &str, data: Value) {
        debug!(event = name, %data, "session event");
        self.events.push_back(TrackedEvent {
            name: name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        });
        while self.events.len() > MAX_TRACKED_EVENTS {
            self.events.pop_front();
        }
    }

    pub fn record_image_selected(&mut self, image: &SelectedImage) {
        self.stats.images_selected += 1;
        self.track_event(
            "image_selected",
            serde_json::json!({
                "size_bytes": image.size_bytes,
                "mime": image.mime,
                "source": image.source.as_str(),
            }),
        );
    }

    pub fn record_photo_captured(&mut self) {
        self.stats.photos_captured += 1;
        self.track_event("photo_captured", Value::Null);
    }

    pub fn record_analysis_requested(&mut self) {
        self.stats.analyses_requested += 1;
        self.track_event("analysis_requested", Value::Null);
    }

    /// Record the origin of a finished analysis
    pub fn record_result(&mut self, origin: &ResultOrigin) {
        match origin {
            ResultOrigin::Remote => self.stats.real_results_shown += 1,
            ResultOrigin::Sample { .. } => self.stats.sample_results_shown += 1,
        }
        self.track_event(
            "analysis_result",
            serde_json::json!({ "sample": origin.is_sample() }),
        );
    }

    /// Get the current status
    pub fn get_status(&self) -> MealSnapStatus {
        let build_info = BuildInfo::current();

        // Get config file size if it exists
        let config_size_bytes = std::fs::metadata(&self.config_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MealSnapStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            config_path: self.config_path.display().to_string(),
            config_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            session_id: self.session_id.clone(),
            stats: self.stats,
            tracked_events: self.events.len(),
        }
    }
}

/// Short session identifier: startup millis plus random bits, base36
fn generate_session_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().unsigned_abs() as u128;
    let random: u32 = rand::random();
    format!("{}{}", to_base36(millis), to_base36(random as u128))
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

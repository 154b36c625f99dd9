// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{capture, mask, network};
use crate::device::DeviceConfig;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Folder under the user config dir holding the settings file
const CONFIG_DIR: &str = "depthview";

/// Settings file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preview / network input width
    pub preview_width: u32,
    /// Preview / network input height
    pub preview_height: u32,
    /// Capture framerate
    pub fps: u32,
    /// Binary threshold applied to the inverted model output
    pub mask_threshold: u8,
    /// Device output queue depth
    pub queue_capacity: usize,
    /// Bounded wait for one frame (milliseconds)
    pub read_timeout_ms: u64,
    /// Path to the depth model blob handed to the device (opaque)
    pub model_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview_width: network::INPUT_WIDTH,
            preview_height: network::INPUT_HEIGHT,
            fps: capture::DEFAULT_FPS,
            mask_threshold: mask::DEFAULT_THRESHOLD,
            queue_capacity: capture::QUEUE_CAPACITY,
            read_timeout_ms: capture::READ_TIMEOUT_MS,
            model_path: None,
        }
    }
}

impl Config {
    /// Load settings from the user config dir, falling back to defaults.
    ///
    /// A missing file is normal on first run; an unreadable or malformed
    /// file is reported and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring malformed config");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings as JSON in the user config dir
    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Settings file location
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Device pipeline configuration derived from these settings
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            preview_width: self.preview_width,
            preview_height: self.preview_height,
            fps: self.fps,
            queue_capacity: self.queue_capacity,
            pool_frames: capture::POOL_FRAMES,
            inference_threads: capture::INFERENCE_THREADS,
            model_path: self.model_path.clone(),
        }
    }

    /// Bounded frame wait as a Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

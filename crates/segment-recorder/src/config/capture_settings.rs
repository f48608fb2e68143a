use crate::{
    AppError, AppResult,
    config::{default_bit_rate, default_height, default_width},
};

use std::panic::Location;

use error_location::ErrorLocation;
use segment_recorder_core::{CaptureConfig, VideoEncoder, VideoSize, VideoSource};
use serde::{Deserialize, Serialize};

/// Capture parameters as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Encoding bit rate in bits per second.
    #[serde(default = "default_bit_rate")]
    pub bit_rate: u32,

    /// Video source token passed to the driver.
    #[serde(default)]
    pub video_source: VideoSource,

    /// Video encoder token passed to the driver.
    #[serde(default)]
    pub video_encoder: VideoEncoder,

    /// Frame width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl CaptureSettings {
    /// Validated session capture configuration.
    #[track_caller]
    pub fn to_capture_config(&self) -> AppResult<CaptureConfig> {
        CaptureConfig::new(
            self.bit_rate,
            self.video_source,
            self.video_encoder,
            VideoSize {
                width: self.width,
                height: self.height,
            },
        )
        .map_err(|e| AppError::ConfigError {
            reason: format!("Invalid [capture] section: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        let defaults = CaptureConfig::DEFAULT;
        Self {
            bit_rate: defaults.bit_rate(),
            video_source: defaults.video_source(),
            video_encoder: defaults.video_encoder(),
            width: defaults.video_size().width,
            height: defaults.video_size().height,
        }
    }
}

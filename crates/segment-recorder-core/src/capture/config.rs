use crate::{CoreError, CoreResult};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Video source selector.
///
/// Opaque capability token: the session passes it through to the
/// [`CaptureDriver`](crate::CaptureDriver), which decides what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    /// Device default source.
    #[default]
    Default,
    /// Physical camera.
    Camera,
    /// Rendered surface or screen.
    Surface,
}

/// Video encoder selector.
///
/// Opaque capability token interpreted by the capture driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoEncoder {
    /// Device default encoder.
    #[default]
    Default,
    /// H.263.
    H263,
    /// H.264 / AVC.
    H264,
    /// MPEG-4 simple profile.
    Mpeg4Sp,
    /// VP8.
    Vp8,
    /// H.265 / HEVC.
    Hevc,
}

impl VideoSource {
    /// Stable token name, suitable for command-line templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSource::Default => "default",
            VideoSource::Camera => "camera",
            VideoSource::Surface => "surface",
        }
    }
}

impl VideoEncoder {
    /// Stable token name, suitable for command-line templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoEncoder::Default => "default",
            VideoEncoder::H263 => "h263",
            VideoEncoder::H264 => "h264",
            VideoEncoder::Mpeg4Sp => "mpeg4_sp",
            VideoEncoder::Vp8 => "vp8",
            VideoEncoder::Hevc => "hevc",
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSize {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Immutable capture parameters, fixed when the session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CaptureConfig {
    bit_rate: u32,
    video_source: VideoSource,
    video_encoder: VideoEncoder,
    video_size: VideoSize,
}

impl CaptureConfig {
    /// 64 KiB per second, default source and encoder, 320x240.
    pub const DEFAULT: CaptureConfig = CaptureConfig {
        bit_rate: 64 * 1024,
        video_source: VideoSource::Default,
        video_encoder: VideoEncoder::Default,
        video_size: VideoSize {
            width: 320,
            height: 240,
        },
    };

    /// Creates a capture configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the bit rate or either frame
    /// dimension is zero.
    #[track_caller]
    pub fn new(
        bit_rate: u32,
        video_source: VideoSource,
        video_encoder: VideoEncoder,
        video_size: VideoSize,
    ) -> CoreResult<Self> {
        if bit_rate == 0 {
            return Err(CoreError::Configuration {
                reason: "Encoding bit rate must be positive".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if video_size.width == 0 || video_size.height == 0 {
            return Err(CoreError::Configuration {
                reason: format!(
                    "Video size must be non-zero, got {}x{}",
                    video_size.width, video_size.height
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            bit_rate,
            video_source,
            video_encoder,
            video_size,
        })
    }

    /// Encoding bit rate in bits per second.
    pub fn bit_rate(&self) -> u32 {
        self.bit_rate
    }

    /// Video source selector.
    pub fn video_source(&self) -> VideoSource {
        self.video_source
    }

    /// Video encoder selector.
    pub fn video_encoder(&self) -> VideoEncoder {
        self.video_encoder
    }

    /// Encoded frame size.
    pub fn video_size(&self) -> VideoSize {
        self.video_size
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

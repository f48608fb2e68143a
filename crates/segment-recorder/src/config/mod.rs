use segment_recorder_core::CaptureConfig;

mod capture_settings;
#[allow(clippy::module_inception)]
mod config;
mod driver_config;
mod logging_config;
mod merge_config;
mod recording_config;

pub(crate) use {
    capture_settings::CaptureSettings,
    config::Config,
    driver_config::DriverConfig,
    logging_config::LoggingConfig,
    merge_config::{MergeConfig, MergeStrategy},
    recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_STOP_TIMEOUT_MS: u64 = 5_000;
pub(crate) const DEFAULT_LOG_FILTER: &str = "segment_recorder=debug,segment_recorder_core=debug";

pub(crate) fn default_bit_rate() -> u32 {
    CaptureConfig::DEFAULT.bit_rate()
}

pub(crate) fn default_width() -> u32 {
    CaptureConfig::DEFAULT.video_size().width
}

pub(crate) fn default_height() -> u32 {
    CaptureConfig::DEFAULT.video_size().height
}

pub(crate) fn default_stop_timeout_ms() -> u64 {
    DEFAULT_STOP_TIMEOUT_MS
}

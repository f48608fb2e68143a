mod config;
mod driver;

pub use {
    config::{CaptureConfig, VideoEncoder, VideoSize, VideoSource},
    driver::{CaptureDriver, CaptureDriverFactory},
};

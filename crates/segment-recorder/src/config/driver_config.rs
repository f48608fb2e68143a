use crate::config::default_stop_timeout_ms;

use serde::{Deserialize, Serialize};

/// External encoder process that records one segment.
///
/// `args` may use `{output}`, `{bit_rate}`, `{width}`, `{height}`,
/// `{source}` and `{encoder}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Encoder executable.
    pub program: String,

    /// Argument template.
    #[serde(default)]
    pub args: Vec<String>,

    /// How long to wait for the encoder to exit after asking it to stop.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            args: [
                "-y",
                "-loglevel",
                "error",
                "-f",
                "x11grab",
                "-video_size",
                "{width}x{height}",
                "-i",
                ":0.0",
                "-b:v",
                "{bit_rate}",
                "-f",
                "mpegts",
                "{output}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Log output configuration. `RUST_LOG` overrides `filter` when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// `EnvFilter` directive (None = built-in default).
    #[serde(default)]
    pub filter: Option<String>,
}

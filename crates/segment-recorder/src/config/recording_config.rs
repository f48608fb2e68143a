use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Container every segment is merged into.
    pub target_path: PathBuf,

    /// Where the in-progress segment lives (None = platform cache dir).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Fixed session id (None = fresh per run). Pinning it lets a new run
    /// find the segment an interrupted run left behind.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

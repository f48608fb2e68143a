use serde::{Deserialize, Serialize};

/// How finalized segments are appended to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Byte concatenation, for stream formats such as MPEG-TS.
    #[default]
    Concat,
    /// External tool, for box-structured containers such as MP4.
    Command,
}

/// Segment merge configuration.
///
/// For the command strategy, `args` may use `{target}`, `{segment}` and
/// `{output}` placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Merge strategy.
    #[serde(default)]
    pub strategy: MergeStrategy,

    /// Merge tool executable (command strategy only).
    #[serde(default)]
    pub program: Option<String>,

    /// Merge tool argument template (command strategy only).
    #[serde(default)]
    pub args: Vec<String>,
}

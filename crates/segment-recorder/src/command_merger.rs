//! Container merger that delegates to an external tool.

use crate::template::render_all;

use std::{
    panic::Location,
    path::Path,
    process::{Command, Stdio},
};

use error_location::ErrorLocation;
use segment_recorder_core::{ContainerMerger, CoreError, CoreResult};
use tracing::{debug, instrument};

/// Runs `program args...` with `{target}`, `{segment}` and `{output}`
/// substituted, expecting the tool to write the merged container to
/// `{output}`.
#[derive(Debug, Clone)]
pub struct CommandMerger {
    program: String,
    args: Vec<String>,
}

impl CommandMerger {
    /// Merger for `program` with an argument template.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl ContainerMerger for CommandMerger {
    #[track_caller]
    #[instrument(skip(self))]
    fn merge(&self, target: &Path, segment: &Path, output: &Path) -> CoreResult<()> {
        let location = Location::caller();

        let target = target.to_string_lossy();
        let segment = segment.to_string_lossy();
        let output = output.to_string_lossy();

        let args = render_all(
            &self.args,
            &[
                ("target", &*target),
                ("segment", &*segment),
                ("output", &*output),
            ],
        )
        .map_err(|name| CoreError::Merge {
            reason: format!("Unknown placeholder {{{name}}} in merge arguments"),
            location: ErrorLocation::from(location),
        })?;

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CoreError::Merge {
                reason: format!("Failed to run {}: {}", self.program, e),
                location: ErrorLocation::from(location),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(CoreError::Merge {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    result.status,
                    stderr.lines().last().unwrap_or("no output")
                ),
                location: ErrorLocation::from(location),
            });
        }

        debug!(program = %self.program, "Merge tool finished");

        Ok(())
    }
}

//! Capture driver backed by an external encoder process.
//!
//! One process per segment. Stopping writes `q` to the encoder's stdin
//! (ffmpeg's graceful-quit key) and closes it, then waits for the process to
//! finalize the container; a process that does not exit in time is killed.

use crate::template::render_all;

use std::{
    io::{self, Write},
    panic::Location,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    time::Duration,
};

use error_location::ErrorLocation;
use segment_recorder_core::{
    CaptureConfig, CaptureDriver, CaptureDriverFactory, CoreError, CoreResult,
};
use tracing::{debug, info, instrument, warn};
use wait_timeout::ChildExt;

/// How long a freshly spawned encoder must stay alive to count as started.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Creates a [`ProcessCaptureDriver`] per segment.
#[derive(Debug, Clone)]
pub struct ProcessDriverFactory {
    program: String,
    args: Vec<String>,
    stop_timeout: Duration,
}

impl ProcessDriverFactory {
    /// Factory for `program` with an argument template.
    pub fn new(program: impl Into<String>, args: Vec<String>, stop_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            stop_timeout,
        }
    }
}

impl CaptureDriverFactory for ProcessDriverFactory {
    fn create(&self) -> CoreResult<Box<dyn CaptureDriver>> {
        Ok(Box::new(ProcessCaptureDriver {
            program: self.program.clone(),
            arg_templates: self.args.clone(),
            stop_timeout: self.stop_timeout,
            args: None,
            output: None,
            child: None,
        }))
    }
}

/// Records one segment by running an external encoder.
pub struct ProcessCaptureDriver {
    program: String,
    arg_templates: Vec<String>,
    stop_timeout: Duration,
    args: Option<Vec<String>>,
    output: Option<PathBuf>,
    child: Option<Child>,
}

impl CaptureDriver for ProcessCaptureDriver {
    #[track_caller]
    #[instrument(skip(self, config))]
    fn configure(&mut self, config: &CaptureConfig, output_path: &Path) -> CoreResult<()> {
        if self.program.trim().is_empty() {
            return Err(CoreError::Configuration {
                reason: "Encoder program is empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let output = output_path.to_string_lossy();
        let bit_rate = config.bit_rate().to_string();
        let width = config.video_size().width.to_string();
        let height = config.video_size().height.to_string();

        let args = render_all(
            &self.arg_templates,
            &[
                ("output", &*output),
                ("bit_rate", bit_rate.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("source", config.video_source().as_str()),
                ("encoder", config.video_encoder().as_str()),
            ],
        )
        .map_err(|name| CoreError::Configuration {
            reason: format!("Unknown placeholder {{{name}}} in encoder arguments"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(program = %self.program, ?args, "Encoder command configured");

        self.args = Some(args);
        self.output = Some(output_path.to_path_buf());

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn prepare_and_begin(&mut self) -> CoreResult<()> {
        let Some(args) = self.args.as_ref() else {
            return Err(CoreError::Device {
                reason: "Encoder started before it was configured".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CoreError::Io {
                reason: format!("Failed to spawn encoder {}", self.program),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        // wait_timeout closes the child's stdin, which the quit key needs later.
        let stdin = child.stdin.take();
        let startup = child.wait_timeout(STARTUP_GRACE);
        child.stdin = stdin;

        match startup {
            Ok(None) => {}
            Ok(Some(status)) => {
                return Err(CoreError::Device {
                    reason: format!("Encoder exited during startup with {}", status),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Io {
                    reason: "Failed to poll encoder process".to_string(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        info!(pid = child.id(), output = ?self.output, "Encoder running");
        self.child = Some(child);

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop_and_release(&mut self) -> CoreResult<()> {
        let Some(mut child) = self.child.take() else {
            return Err(CoreError::Device {
                reason: "Encoder is not running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(b"q").and_then(|()| stdin.flush()) {
                Ok(()) => {}
                // Encoder already gone; its exit status below tells us how.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => warn!(error = ?e, "Failed to ask encoder to quit"),
            }
        }

        let status = match child.wait_timeout(self.stop_timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Device {
                    reason: format!(
                        "Encoder did not stop within {} ms and was killed",
                        self.stop_timeout.as_millis()
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Io {
                    reason: "Failed to wait for encoder".to_string(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        if !status.success() {
            return Err(CoreError::Device {
                reason: format!("Encoder exited with {}", status),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(output = ?self.output, "Encoder stopped");

        Ok(())
    }
}

impl Drop for ProcessCaptureDriver {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!(pid = child.id(), "Encoder still running on drop, killing");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

use crate::{CaptureConfig, CoreResult};

use std::path::Path;

/// Narrow capability interface over a device encoding pipeline.
///
/// One driver instance records exactly one segment: it is configured,
/// started, stopped and then dropped. The session never reuses a driver
/// across segments, so implementations may assume a single pass through
/// `configure` -> `prepare_and_begin` -> `stop_and_release`.
pub trait CaptureDriver: Send {
    /// Apply capture parameters and point the encoder at `output_path`.
    ///
    /// Must not create or modify `output_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`](crate::CoreError::Configuration)
    /// if the parameters are invalid or unsupported by the device.
    fn configure(&mut self, config: &CaptureConfig, output_path: &Path) -> CoreResult<()>;

    /// Prepare the encoder and begin writing the segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`](crate::CoreError::Io) or
    /// [`CoreError::Device`](crate::CoreError::Device) if the output path is
    /// unwritable or the encoder cannot start.
    fn prepare_and_begin(&mut self) -> CoreResult<()>;

    /// Stop capturing, finalize the segment and release device resources.
    ///
    /// Device resources must be released even when an error is reported.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`](crate::CoreError::Io) or
    /// [`CoreError::Device`](crate::CoreError::Device) if the device cannot be
    /// cleanly stopped.
    fn stop_and_release(&mut self) -> CoreResult<()>;
}

/// Produces a fresh [`CaptureDriver`] for every segment.
pub trait CaptureDriverFactory: Send + Sync + 'static {
    /// Acquire a new, unconfigured driver.
    ///
    /// # Errors
    ///
    /// Returns an error if no capture device can be acquired.
    fn create(&self) -> CoreResult<Box<dyn CaptureDriver>>;
}

impl<F> CaptureDriverFactory for F
where
    F: Fn() -> CoreResult<Box<dyn CaptureDriver>> + Send + Sync + 'static,
{
    fn create(&self) -> CoreResult<Box<dyn CaptureDriver>> {
        self()
    }
}

use crate::{Operation, SessionStatus};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Capture parameters are invalid or unsupported by the device.
    #[error("Configuration error: {reason} {location}")]
    Configuration {
        /// Description of the rejected parameter.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Device or filesystem I/O failed while starting or stopping a capture.
    #[error("IO error: {reason}: {source} {location}")]
    Io {
        /// What was being attempted.
        reason: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture device could not be driven or cleanly stopped.
    #[error("Device error: {reason} {location}")]
    Device {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Appending a finalized segment onto the target container failed.
    #[error("Merge error: {reason} {location}")]
    Merge {
        /// Description of the merge failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation requested from a state that does not permit it.
    #[error("Cannot {operation} while {status} (in flight: {in_flight}) {location}")]
    ContractViolation {
        /// The rejected operation.
        operation: Operation,
        /// Session status at the time of the request.
        status: SessionStatus,
        /// Whether another operation was still queued or running.
        in_flight: bool,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No async runtime is available, or the task runner has shut down.
    #[error("Runtime error: {reason} {location}")]
    Runtime {
        /// Description of the runtime problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A background operation body panicked or was aborted.
    #[error("Background task failed: {reason} {location}")]
    TaskFailed {
        /// Description of the task failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

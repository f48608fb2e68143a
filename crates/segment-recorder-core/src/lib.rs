//! Segment Recorder Core Library
//!
//! Pause/resume video recording on top of a capture device that can only
//! record one continuous segment at a time. Each pause finalizes the current
//! segment and merges it onto a single target container, so the target is
//! always a complete, playable file whenever the session reports `Paused`.
//!
//! # Example
//!
//! ```no_run
//! use segment_recorder_core::{CaptureDriver, CoreResult, SessionController};
//!
//! # fn open_device() -> CoreResult<Box<dyn CaptureDriver>> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let session = SessionController::builder("out.ts").build(open_device)?;
//!
//!     session.start_async().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     let target = session.pause_async().await?;
//!
//!     println!("Recorded into {}", target.display());
//!     session.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod runner;
mod segment;
mod session;

pub use {
    capture::{
        CaptureConfig, CaptureDriver, CaptureDriverFactory, VideoEncoder, VideoSize, VideoSource,
    },
    error::{CoreError, Result as CoreResult},
    runner::{AsyncTaskRunner, Notification},
    segment::{ByteConcatMerger, ContainerMerger, SegmentStore},
    session::{
        Operation, PauseListener, SessionBuilder, SessionController, SessionStatus, StartListener,
    },
};

#[cfg(test)]
mod tests;

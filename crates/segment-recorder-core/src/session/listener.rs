use crate::{CoreError, CoreResult};

use std::path::PathBuf;

/// Receives the outcome of [`SessionController::start`](crate::SessionController::start).
///
/// Exactly one method is called, exactly once, on the session's callback
/// context after the new status is committed.
pub trait StartListener: Send + 'static {
    /// Capture is running; status is `Recording`.
    fn on_started(self);

    /// Start failed; status is `Ready`.
    fn on_exception(self, error: CoreError);
}

/// Receives the outcome of [`SessionController::pause`](crate::SessionController::pause).
///
/// Exactly one method is called, exactly once, on the session's callback
/// context after the new status is committed.
pub trait PauseListener: Send + 'static {
    /// Segment merged; status is `Paused` and `target_path` is complete.
    fn on_paused(self, target_path: PathBuf);

    /// Stop or merge failed; status is `Ready`.
    fn on_exception(self, error: CoreError);
}

impl<F> StartListener for F
where
    F: FnOnce(CoreResult<()>) + Send + 'static,
{
    fn on_started(self) {
        self(Ok(()))
    }

    fn on_exception(self, error: CoreError) {
        self(Err(error))
    }
}

impl<F> PauseListener for F
where
    F: FnOnce(CoreResult<PathBuf>) + Send + 'static,
{
    fn on_paused(self, target_path: PathBuf) {
        self(Ok(target_path))
    }

    fn on_exception(self, error: CoreError) {
        self(Err(error))
    }
}

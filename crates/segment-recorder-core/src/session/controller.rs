//! Session state machine and public operation surface.
//!
//! ```text
//!   READY ──start──▶ RECORDING ──pause──▶ PAUSED
//!     ▲   ◀─fail──┘      │                  │
//!     │                  │ fail             │ start
//!     └──────────────────┘                  ▼
//!     ▲                                 RECORDING
//!     └───────────────fail (start)──────────┘
//! ```
//!
//! Disallowed calls (pause while not recording, start while recording, or
//! anything while an operation is still in flight) are rejected
//! synchronously with [`CoreError::ContractViolation`] and never reach the
//! task runner.

use crate::{
    AsyncTaskRunner, CaptureConfig, CaptureDriver, CaptureDriverFactory, CoreError, CoreResult,
    Notification, Operation, PauseListener, SegmentStore, SessionBuilder, SessionStatus,
    StartListener,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct SessionState {
    status: SessionStatus,
    in_flight: bool,
}

/// State shared between the controller and its background operations.
///
/// `state` is read synchronously by callers; `driver` is only touched from
/// operation bodies, which the runner serializes.
struct SessionShared {
    state: Mutex<SessionState>,
    driver: Mutex<Option<Box<dyn CaptureDriver>>>,
}

impl SessionShared {
    // Poisoning only means a holder panicked; the plain-data state is still valid.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| {
            error!("Session state lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn driver(&self) -> MutexGuard<'_, Option<Box<dyn CaptureDriver>>> {
        self.driver.lock().unwrap_or_else(|e| {
            error!("Capture driver lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn settle(&self, status: SessionStatus) {
        let mut state = self.state();
        state.status = status;
        state.in_flight = false;
    }
}

/// Controls one segmented recording session.
///
/// # Thread Safety
///
/// All methods take `&self`. Status queries are synchronous and never
/// block on device or file I/O; `start` and `pause` only validate and
/// enqueue, and report their outcome through a listener.
pub struct SessionController {
    id: Uuid,
    config: CaptureConfig,
    store: Arc<SegmentStore>,
    factory: Arc<dyn CaptureDriverFactory>,
    shared: Arc<SessionShared>,
    runner: AsyncTaskRunner,
}

impl SessionController {
    /// Starts building a session that records into `target_path`.
    pub fn builder(target_path: impl Into<PathBuf>) -> SessionBuilder {
        SessionBuilder::new(target_path.into())
    }

    /// Builds a session with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] if called outside a tokio runtime.
    #[track_caller]
    pub fn new<F: CaptureDriverFactory>(
        target_path: impl Into<PathBuf>,
        factory: F,
    ) -> CoreResult<Self> {
        Self::builder(target_path).build(factory)
    }

    pub(crate) fn assemble(
        id: Uuid,
        config: CaptureConfig,
        store: SegmentStore,
        factory: Arc<dyn CaptureDriverFactory>,
        runner: AsyncTaskRunner,
    ) -> Self {
        let session = Self {
            id,
            config,
            store: Arc::new(store),
            factory,
            shared: Arc::new(SessionShared {
                state: Mutex::new(SessionState {
                    status: SessionStatus::Unknown,
                    in_flight: false,
                }),
                driver: Mutex::new(None),
            }),
            runner,
        };

        session.shared.state().status = SessionStatus::Ready;

        info!(
            session_id = %session.id,
            target = ?session.store.target_path(),
            segment = ?session.store.temporary_segment_path(),
            "Session ready"
        );

        session
    }

    /// Starts capturing a new segment.
    ///
    /// Returns once the operation is queued. The listener later receives
    /// `on_started` (status `Recording`) or `on_exception` (status `Ready`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContractViolation`] if the session is recording
    /// or another operation is in flight, and [`CoreError::Runtime`] if the
    /// session has shut down. The listener is not called in either case.
    #[track_caller]
    #[instrument(skip(self, listener), fields(session_id = %self.id))]
    pub fn start<L: StartListener>(&self, listener: L) -> CoreResult<()> {
        self.begin(Operation::Start)?;

        let factory = Arc::clone(&self.factory);
        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        let config = self.config;
        let session_id = self.id;

        let body = move || start_segment(factory.as_ref(), &store, &config);

        let settle = move |result: CoreResult<Box<dyn CaptureDriver>>| -> Notification {
            match result {
                Ok(driver) => {
                    *shared.driver() = Some(driver);
                    shared.settle(Operation::Start.success_status());
                    info!(session_id = %session_id, "Recording started");
                    Box::new(move || listener.on_started())
                }
                Err(e) => {
                    *shared.driver() = None;
                    shared.settle(SessionStatus::Ready);
                    warn!(session_id = %session_id, error = ?e, "Start failed, session ready");
                    Box::new(move || listener.on_exception(e))
                }
            }
        };

        self.submit(Operation::Start, body, settle)
    }

    /// Stops the current segment and merges it into the target.
    ///
    /// Returns once the operation is queued. The listener later receives
    /// `on_paused(target_path)` (status `Paused`) or `on_exception` (status
    /// `Ready`). A pause is only reported once the segment is merged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContractViolation`] if the session is not
    /// recording or another operation is in flight, and
    /// [`CoreError::Runtime`] if the session has shut down. The listener is
    /// not called in either case.
    #[track_caller]
    #[instrument(skip(self, listener), fields(session_id = %self.id))]
    pub fn pause<L: PauseListener>(&self, listener: L) -> CoreResult<()> {
        self.begin(Operation::Pause)?;

        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        let body_shared = Arc::clone(&self.shared);
        let session_id = self.id;

        let body = move || {
            let driver = body_shared.driver().take();
            pause_segment(driver, &store)
        };

        let settle = move |result: CoreResult<PathBuf>| -> Notification {
            match result {
                Ok(target_path) => {
                    shared.settle(Operation::Pause.success_status());
                    info!(session_id = %session_id, target = ?target_path, "Recording paused");
                    Box::new(move || listener.on_paused(target_path))
                }
                Err(e) => {
                    shared.settle(SessionStatus::Ready);
                    warn!(session_id = %session_id, error = ?e, "Pause failed, session ready");
                    Box::new(move || listener.on_exception(e))
                }
            }
        };

        self.submit(Operation::Pause, body, settle)
    }

    /// [`start`](Self::start), awaiting the outcome.
    ///
    /// # Errors
    ///
    /// Returns the synchronous rejection, or the error the listener would
    /// have received.
    pub async fn start_async(&self) -> CoreResult<()> {
        let (tx, rx) = oneshot::channel();
        self.start(move |result: CoreResult<()>| {
            let _ = tx.send(result);
        })?;
        await_outcome(rx).await
    }

    /// [`pause`](Self::pause), awaiting the outcome.
    ///
    /// # Errors
    ///
    /// Returns the synchronous rejection, or the error the listener would
    /// have received.
    pub async fn pause_async(&self) -> CoreResult<PathBuf> {
        let (tx, rx) = oneshot::channel();
        self.pause(move |result: CoreResult<PathBuf>| {
            let _ = tx.send(result);
        })?;
        await_outcome(rx).await
    }

    /// Waits for queued work to settle, pauses if still recording so the
    /// last segment reaches the target, then stops the task runner.
    ///
    /// # Errors
    ///
    /// Returns the final pause's error, if it failed. The runner is stopped
    /// regardless.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn shutdown(self) -> CoreResult<SessionStatus> {
        if let Err(e) = self.runner.flush().await {
            warn!(error = ?e, "Failed to drain queued operations");
        }

        let final_pause = if self.is_recording() {
            info!("Recording at shutdown, pausing to merge the last segment");
            self.pause_async().await.map(|_| ())
        } else {
            Ok(())
        };

        let status = self.status();
        self.runner.shutdown().await;

        info!(%status, "Session shut down");

        final_pause.map(|()| status)
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.shared.state().status
    }

    /// Whether a segment is being captured.
    pub fn is_recording(&self) -> bool {
        self.status() == SessionStatus::Recording
    }

    /// Whether the session is idle and safe to start.
    pub fn is_ready(&self) -> bool {
        self.status() == SessionStatus::Ready
    }

    /// Whether every segment so far is merged into the target.
    pub fn is_paused(&self) -> bool {
        self.status() == SessionStatus::Paused
    }

    /// Whether a start or pause is queued or running.
    pub fn in_flight(&self) -> bool {
        self.shared.state().in_flight
    }

    /// Target container path. Fixed for the session's lifetime.
    pub fn record_file_name(&self) -> &Path {
        self.store.target_path()
    }

    /// Session identifier, also embedded in the temporary segment path.
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Capture parameters applied to every segment.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Scratch path the active capture writes to.
    pub fn temporary_segment_path(&self) -> &Path {
        self.store.temporary_segment_path()
    }

    /// Segment left behind by a failed pause, if any.
    ///
    /// Always `None` while recording, since the file then belongs to the
    /// active capture.
    pub fn orphaned_segment(&self) -> Option<&Path> {
        let state = *self.shared.state();
        if state.in_flight || state.status == SessionStatus::Recording {
            return None;
        }
        self.store.orphaned_segment()
    }

    #[track_caller]
    fn begin(&self, operation: Operation) -> CoreResult<()> {
        let mut state = self.shared.state();

        if state.in_flight || !operation.permitted_from(state.status) {
            warn!(
                %operation,
                status = %state.status,
                in_flight = state.in_flight,
                "Rejected operation"
            );
            return Err(CoreError::ContractViolation {
                operation,
                status: state.status,
                in_flight: state.in_flight,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        state.in_flight = true;
        debug!(%operation, status = %state.status, "Operation accepted");

        Ok(())
    }

    #[track_caller]
    fn submit<T, B, S>(&self, operation: Operation, body: B, settle: S) -> CoreResult<()>
    where
        T: Send + 'static,
        B: FnOnce() -> CoreResult<T> + Send + 'static,
        S: FnOnce(CoreResult<T>) -> Notification + Send + 'static,
    {
        let label = match operation {
            Operation::Start => "start",
            Operation::Pause => "pause",
        };

        self.runner.submit(label, body, settle).inspect_err(|e| {
            // Nothing was queued, so nothing will settle the flag.
            self.shared.state().in_flight = false;
            error!(%operation, error = ?e, "Failed to queue operation");
        })
    }
}

/// Start body: acquire, configure and begin a fresh driver.
///
/// The segment file is only touched once the configuration is accepted.
fn start_segment(
    factory: &dyn CaptureDriverFactory,
    store: &SegmentStore,
    config: &CaptureConfig,
) -> CoreResult<Box<dyn CaptureDriver>> {
    let mut driver = factory.create()?;
    driver.configure(config, store.temporary_segment_path())?;
    debug!(segment = ?store.temporary_segment_path(), "Capture driver configured");

    store.prepare_segment()?;

    if let Err(e) = driver.prepare_and_begin() {
        if let Err(release_err) = driver.stop_and_release() {
            debug!(error = ?release_err, "Release after failed start also failed");
        }
        return Err(e);
    }

    Ok(driver)
}

/// Pause body: finalize the segment, then merge it into the target.
fn pause_segment(
    driver: Option<Box<dyn CaptureDriver>>,
    store: &SegmentStore,
) -> CoreResult<PathBuf> {
    let Some(mut driver) = driver else {
        return Err(CoreError::Device {
            reason: "No active capture driver".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    };

    let stopped = driver.stop_and_release();
    drop(driver);
    stopped?;
    debug!(segment = ?store.temporary_segment_path(), "Segment finalized");

    store.merge_segment()?;

    if let Err(e) = store.discard_orphan() {
        // The target already holds the segment; a leftover file is only overwritten later.
        warn!(error = ?e, "Failed to remove merged segment");
    }

    Ok(store.target_path().to_path_buf())
}

async fn await_outcome<T>(rx: oneshot::Receiver<CoreResult<T>>) -> CoreResult<T> {
    rx.await.map_err(|_| CoreError::TaskFailed {
        reason: "Operation finished without a notification".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?
}

use crate::{CoreError, CoreResult};

use std::{
    future::Future,
    panic::{AssertUnwindSafe, Location},
    pin::Pin,
};

use error_location::ErrorLocation;
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{Instrument, debug, error, info_span, warn};

/// Terminal notification for one operation, run on the callback context.
pub type Notification = Box<dyn FnOnce() + Send + 'static>;

type Job = Pin<Box<dyn Future<Output = Notification> + Send + 'static>>;

/// Runs operation bodies off the caller's thread, one at a time.
///
/// # Execution Model
///
/// - **Worker**: a single task draining a FIFO job queue. Each body runs on
///   the blocking pool, and the worker waits for it before taking the next
///   job, so bodies never overlap.
/// - **Settle**: after a body returns, its settle step runs on the worker.
///   This is where callers commit state, so by the time a notification is
///   handed off, all state mutation for that operation is done.
/// - **Dispatcher**: a single task that runs notifications in the order the
///   worker produced them, which is submission order.
///
/// Every accepted submission yields exactly one notification, including
/// when the body panics.
pub struct AsyncTaskRunner {
    job_tx: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl AsyncTaskRunner {
    /// Spawns the worker and dispatcher on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] if called outside a tokio runtime.
    #[track_caller]
    pub fn new() -> CoreResult<Self> {
        let handle = Handle::try_current().map_err(|e| CoreError::Runtime {
            reason: format!("No tokio runtime available: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (job_tx, mut job_rx) = mpsc::unbounded_channel::<Job>();
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Notification>();

        let worker = handle.spawn(async move {
            while let Some(job) = job_rx.recv().await {
                let notification = job.await;
                if notify_tx.send(notification).is_err() {
                    warn!("Notification dispatcher gone, dropping remaining jobs");
                    break;
                }
            }
            debug!("Task runner worker stopped");
        });

        let dispatcher = handle.spawn(async move {
            while let Some(notification) = notify_rx.recv().await {
                // A panicking listener must not take the dispatcher down with it.
                if std::panic::catch_unwind(AssertUnwindSafe(notification)).is_err() {
                    error!("Listener panicked while handling a notification");
                }
            }
            debug!("Task runner dispatcher stopped");
        });

        Ok(Self {
            job_tx,
            worker,
            dispatcher,
        })
    }

    /// Queues `body` for execution.
    ///
    /// `body` runs on the blocking pool; `settle` then runs on the worker with
    /// the body's result (a panic becomes [`CoreError::TaskFailed`]) and
    /// returns the notification to dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] if the runner has shut down. Neither
    /// closure runs in that case.
    #[track_caller]
    pub fn submit<T, B, S>(&self, label: &'static str, body: B, settle: S) -> CoreResult<()>
    where
        T: Send + 'static,
        B: FnOnce() -> CoreResult<T> + Send + 'static,
        S: FnOnce(CoreResult<T>) -> Notification + Send + 'static,
    {
        let location = Location::caller();

        let job: Job = Box::pin(
            async move {
                let result = match tokio::task::spawn_blocking(body).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(error = ?e, "Operation body did not complete");
                        Err(CoreError::TaskFailed {
                            reason: format!("{label} body did not complete: {e}"),
                            location: ErrorLocation::from(location),
                        })
                    }
                };
                settle(result)
            }
            .instrument(info_span!("operation", label)),
        );

        self.job_tx.send(job).map_err(|_| CoreError::Runtime {
            reason: format!("Task runner shut down, cannot run {label}"),
            location: ErrorLocation::from(location),
        })
    }

    /// Waits until every job submitted so far has settled and its
    /// notification has been dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] if the runner has shut down.
    pub async fn flush(&self) -> CoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(
            "flush",
            || Ok(()),
            move |_: CoreResult<()>| -> Notification {
                Box::new(move || {
                    let _ = done_tx.send(());
                })
            },
        )?;

        done_rx.await.map_err(|_| CoreError::Runtime {
            reason: "Task runner stopped before flush completed".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Stops accepting work, lets queued jobs finish, and waits for every
    /// pending notification to be dispatched.
    pub async fn shutdown(self) {
        let Self {
            job_tx,
            worker,
            dispatcher,
        } = self;

        drop(job_tx);

        if let Err(e) = worker.await {
            error!(error = ?e, "Task runner worker panicked");
        }
        if let Err(e) = dispatcher.await {
            error!(error = ?e, "Task runner dispatcher panicked");
        }
    }
}

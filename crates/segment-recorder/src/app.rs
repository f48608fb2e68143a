use crate::{AppCommand, AppResult, EventListener, SessionEvent};

use segment_recorder_core::{Operation, SessionController};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Owns the recording session and serializes console commands against it.
/// Operation outcomes come back through `event_rx`, so the loop never
/// blocks on device or file I/O.
pub struct App {
    pub(crate) session: SessionController,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) event_tx: mpsc::UnboundedSender<SessionEvent>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self), fields(session_id = %self.session.session_id()))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(
            target_path = ?self.session.record_file_name(),
            "Segment recorder starting"
        );

        if let Some(orphan) = self.session.orphaned_segment() {
            warn!(segment = ?orphan, "Found segment left by an earlier run; the next start overwrites it");
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(AppCommand::Start) => self.start(),
                        Some(AppCommand::Pause) => self.pause(),
                        Some(AppCommand::Status) => self.log_status(),
                        Some(AppCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    log_event(event);
                }
            }
        }

        let _ = self.shutdown_tx.send(true);

        let Self {
            session,
            mut event_rx,
            event_tx,
            ..
        } = self;
        drop(event_tx);

        let result = session.shutdown().await;

        // Outcomes dispatched while draining the session.
        while let Ok(event) = event_rx.try_recv() {
            log_event(event);
        }

        match result {
            Ok(status) => info!(%status, "Segment recorder shut down successfully"),
            Err(e) => error!(error = ?e, "Final segment could not be merged"),
        }

        Ok(())
    }

    fn start(&self) {
        let listener = EventListener::new(Operation::Start, self.event_tx.clone());
        if let Err(e) = self.session.start(listener) {
            warn!(error = %e, "Start rejected");
        }
    }

    fn pause(&self) {
        let listener = EventListener::new(Operation::Pause, self.event_tx.clone());
        if let Err(e) = self.session.pause(listener) {
            warn!(error = %e, "Pause rejected");
        }
    }

    fn log_status(&self) {
        info!(
            status = %self.session.status(),
            in_flight = self.session.in_flight(),
            target_path = ?self.session.record_file_name(),
            segment = ?self.session.temporary_segment_path(),
            orphan = ?self.session.orphaned_segment(),
            "Session status"
        );
    }
}

fn log_event(event: SessionEvent) {
    match event {
        SessionEvent::Started => info!("Recording"),
        SessionEvent::Paused { target_path } => {
            info!(target_path = ?target_path, "Paused, target is complete")
        }
        SessionEvent::Failed { operation, error } => {
            error!(%operation, error = ?error, "Operation failed, session ready to retry")
        }
    }
}

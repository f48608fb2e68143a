use segment_recorder_core::{
    CoreError, Operation, PauseListener, StartListener,
};

use std::path::PathBuf;

use tokio::sync::mpsc;

/// Session outcomes forwarded to the application loop.
#[derive(Debug)]
pub enum SessionEvent {
    /// Capture is running.
    Started,
    /// Segment merged into the target.
    Paused {
        /// The completed target container.
        target_path: PathBuf,
    },
    /// An operation failed and the session is back to ready.
    Failed {
        /// The operation that failed.
        operation: Operation,
        /// Why it failed.
        error: CoreError,
    },
}

/// Listener that forwards its single outcome as a [`SessionEvent`].
///
/// If the application loop is gone the event is dropped; the session's own
/// state is already committed by then.
pub struct EventListener {
    operation: Operation,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventListener {
    /// Listener for `operation` reporting into `event_tx`.
    pub fn new(operation: Operation, event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            operation,
            event_tx,
        }
    }

    fn forward(self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    fn fail(self, error: CoreError) {
        let operation = self.operation;
        self.forward(SessionEvent::Failed { operation, error });
    }
}

impl StartListener for EventListener {
    fn on_started(self) {
        self.forward(SessionEvent::Started);
    }

    fn on_exception(self, error: CoreError) {
        self.fail(error);
    }
}

impl PauseListener for EventListener {
    fn on_paused(self, target_path: PathBuf) {
        self.forward(SessionEvent::Paused { target_path });
    }

    fn on_exception(self, error: CoreError) {
        self.fail(error);
    }
}

use crate::{EventListener, SessionEvent};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use segment_recorder_core::{CoreError, Operation, PauseListener, StartListener};
use tokio::sync::mpsc;

/// WHAT: Each listener outcome becomes exactly one event
/// WHY: The application loop reports every operation once
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_listeners_when_notified_then_events_forwarded() {
    // Given: An event channel
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // When: A start succeeds and a pause fails
    StartListener::on_started(EventListener::new(Operation::Start, event_tx.clone()));
    PauseListener::on_exception(
        EventListener::new(Operation::Pause, event_tx.clone()),
        CoreError::Merge {
            reason: "disk full".to_string(),
            location: ErrorLocation::from(Location::caller()),
        },
    );
    PauseListener::on_paused(
        EventListener::new(Operation::Pause, event_tx),
        PathBuf::from("out.ts"),
    );

    // Then: Three events in order, tagged with their operation
    assert!(matches!(event_rx.try_recv().unwrap(), SessionEvent::Started));
    assert!(matches!(
        event_rx.try_recv().unwrap(),
        SessionEvent::Failed {
            operation: Operation::Pause,
            error: CoreError::Merge { .. }
        }
    ));
    match event_rx.try_recv().unwrap() {
        SessionEvent::Paused { target_path } => assert_eq!(target_path, PathBuf::from("out.ts")),
        other => panic!("expected paused event, got {:?}", other),
    }
    assert!(event_rx.try_recv().is_err());
}

/// WHAT: A listener outliving the application loop does not fail
/// WHY: Sessions may finish an operation after the loop has exited
#[test]
fn given_closed_event_channel_when_notified_then_event_dropped_quietly() {
    // Given: A channel whose receiver is gone
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    drop(event_rx);

    // When / Then: Notifying does not panic
    StartListener::on_started(EventListener::new(Operation::Start, event_tx));
}

use crate::{App, AppCommand, ProcessDriverFactory};

use std::{fs, time::Duration};

use segment_recorder_core::SessionController;
use tokio::sync::{mpsc, watch};

/// WHAT: Shutdown while recording merges the running segment
/// WHY: Quitting the console must never lose footage
#[cfg(unix)]
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_app_when_shutdown_then_segment_merged_and_console_stopped() {
    // Given: An app over a stdin-copying encoder
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.ts");
    let factory = ProcessDriverFactory::new(
        "sh",
        vec!["-c".into(), "cat > \"$0\"".into(), "{output}".into()],
        Duration::from_secs(5),
    );
    let session = SessionController::builder(&target)
        .scratch_dir(dir.path().join("scratch"))
        .build(factory)
        .unwrap();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let app = App {
        session,
        command_rx,
        event_tx,
        event_rx,
        shutdown_tx,
    };

    // When: Starting then quitting
    command_tx.send(AppCommand::Start).await.unwrap();
    command_tx.send(AppCommand::Status).await.unwrap();
    command_tx.send(AppCommand::Shutdown).await.unwrap();
    app.run().await.unwrap();

    // Then: The segment landed in the target and the console was told to stop
    assert_eq!(fs::read(&target).unwrap(), b"q");
    assert!(*shutdown_rx.borrow_and_update());
}

/// WHAT: Closing the command channel ends the app without recording
/// WHY: Losing the console must not leave the app running
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_app_when_command_channel_closes_then_exits_without_target() {
    // Given: An idle app
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.ts");
    let session = SessionController::builder(&target)
        .scratch_dir(dir.path().join("scratch"))
        .build(ProcessDriverFactory::new("true", vec![], Duration::ZERO))
        .unwrap();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, _shutdown_rx) = watch::channel(false);
    let app = App {
        session,
        command_rx,
        event_tx,
        event_rx,
        shutdown_tx,
    };

    // When: The console goes away
    drop(command_tx);
    app.run().await.unwrap();

    // Then: Nothing was recorded
    assert!(!target.exists());
}

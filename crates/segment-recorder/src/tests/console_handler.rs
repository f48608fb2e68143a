use crate::{AppCommand, ConsoleHandler};

use tokio::{
    io::BufReader,
    sync::{mpsc, watch},
};

/// WHAT: Console lines become commands in order, unknown lines skipped
/// WHY: The console is the only control surface of the binary
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_console_script_when_running_then_commands_forwarded_in_order() {
    // Given: A scripted console ending in quit, with noise in between
    let input: &[u8] = b"start\n\nbogus\nstatus\npause\nquit\nstart\n";
    let (command_tx, mut command_rx) = mpsc::channel(32);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let handler = ConsoleHandler::new(command_tx);

    // When: Running over the script
    handler
        .run_with(BufReader::new(input), shutdown_rx)
        .await
        .unwrap();
    drop(handler);

    // Then: Commands up to quit arrive in order, nothing after it
    let mut received = Vec::new();
    while let Some(cmd) = command_rx.recv().await {
        received.push(cmd);
    }
    assert_eq!(
        received,
        vec![
            AppCommand::Start,
            AppCommand::Status,
            AppCommand::Pause,
            AppCommand::Shutdown
        ]
    );
}

/// WHAT: End of input requests shutdown
/// WHY: Closing stdin must still merge the last segment and exit cleanly
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_input_without_quit_when_input_ends_then_shutdown_sent() {
    // Given: Input that just ends
    let input: &[u8] = b"start\n";
    let (command_tx, mut command_rx) = mpsc::channel(32);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let handler = ConsoleHandler::new(command_tx);

    // When: Running to end of input
    handler
        .run_with(BufReader::new(input), shutdown_rx)
        .await
        .unwrap();

    // Then: Start followed by Shutdown
    assert_eq!(command_rx.recv().await, Some(AppCommand::Start));
    assert_eq!(command_rx.recv().await, Some(AppCommand::Shutdown));
}

/// WHAT: Closed command channel surfaces as an error
/// WHY: The console must stop once the application loop is gone
#[tokio::test]
async fn given_closed_channel_when_sending_command_then_channel_error() {
    // Given: A command channel whose receiver is dropped
    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_rx);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let handler = ConsoleHandler::new(command_tx);

    // When: Running with a command
    let result = handler
        .run_with(BufReader::new(&b"pause\n"[..]), shutdown_rx)
        .await;

    // Then: Channel send error
    assert!(matches!(
        result,
        Err(crate::AppError::ChannelSendFailed { .. })
    ));
}

//! Console control surface.
//!
//! Reads one command per line from stdin and forwards it to the main
//! application. End of input is treated as a shutdown request.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Help text logged on `help` or unrecognized input.
const USAGE: &str = "commands: start | pause | status | quit";

/// Forwards console lines to the application as [`AppCommand`]s.
pub struct ConsoleHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleHandler {
    /// Create a handler sending into `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Read commands from stdin until shutdown or end of input.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        info!("{}", USAGE);
        self.run_with(BufReader::new(tokio::io::stdin()), shutdown_rx)
            .await
    }

    /// Read commands from `reader` until shutdown or end of input.
    pub async fn run_with<R>(
        &self,
        reader: R,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Console input closed");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };

                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match AppCommand::parse(trimmed) {
                        Some(command) => {
                            let is_shutdown = command == AppCommand::Shutdown;
                            self.send(command).await?;
                            if is_shutdown {
                                break;
                            }
                        }
                        None if trimmed.eq_ignore_ascii_case("help") => info!("{}", USAGE),
                        None => warn!(input = trimmed, usage = USAGE, "Unknown command"),
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

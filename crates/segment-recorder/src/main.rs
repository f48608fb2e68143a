//! Segment Recorder: pause/resume video recording from the console.

mod app;
mod app_command;
mod command_merger;
mod config;
mod console_handler;
mod error;
mod process_driver;
mod session_event;
mod template;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    command_merger::CommandMerger,
    console_handler::ConsoleHandler,
    error::{AppError, Result as AppResult},
    process_driver::ProcessDriverFactory,
    session_event::{EventListener, SessionEvent},
};

use crate::config::{Config, DEFAULT_LOG_FILTER, LoggingConfig, MergeStrategy};

use std::{path::PathBuf, time::Duration};

use segment_recorder_core::{ByteConcatMerger, SessionController};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Usage: `segment-recorder [CONFIG_PATH]`
fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let config = match Config::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let exit_code = rt.block_on(async {
        let session = match build_session(&config) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to create session: {:?}", e);
                return 1;
            }
        };

        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app = App {
            session,
            command_rx,
            event_tx,
            event_rx,
            shutdown_tx,
        };

        let (_, app_result) = tokio::join!(
            async move {
                let console = ConsoleHandler::new(command_tx);
                if let Err(e) = console.run(shutdown_rx).await {
                    error!(error = ?e, "Console handler error");
                }
            },
            app.run()
        );

        match app_result {
            Ok(()) => 0,
            Err(e) => {
                error!(error = ?e, "App error");
                1
            }
        }
    });

    // Stdin reads park a blocking-pool thread that never returns on its own.
    rt.shutdown_timeout(Duration::from_secs(1));

    std::process::exit(exit_code);
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[track_caller]
fn build_session(config: &Config) -> AppResult<SessionController> {
    let factory = ProcessDriverFactory::new(
        config.driver.program.clone(),
        config.driver.args.clone(),
        Duration::from_millis(config.driver.stop_timeout_ms),
    );

    let mut builder = SessionController::builder(&config.recording.target_path)
        .config(config.capture.to_capture_config()?)
        .scratch_dir(config.scratch_dir()?);

    if let Some(session_id) = config.recording.session_id {
        builder = builder.session_id(session_id);
    }

    let builder = match config.merge.strategy {
        MergeStrategy::Concat => builder.merger(ByteConcatMerger),
        MergeStrategy::Command => builder.merger(CommandMerger::new(
            config.merge.program.clone().unwrap_or_default(),
            config.merge.args.clone(),
        )),
    };

    Ok(builder.build(factory)?)
}

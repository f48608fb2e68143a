/// Commands sent from the console handler to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start or resume recording.
    Start,
    /// Pause recording and merge the current segment.
    Pause,
    /// Log the session status.
    Status,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Parse one console line. Returns `None` for unrecognized input.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "resume" | "r" => Some(AppCommand::Start),
            "pause" | "p" => Some(AppCommand::Pause),
            "status" | "s" => Some(AppCommand::Status),
            "quit" | "exit" | "q" => Some(AppCommand::Shutdown),
            _ => None,
        }
    }
}

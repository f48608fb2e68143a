use std::fmt;

use serde::Serialize;

/// Recording session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Before construction completes. Never observable on a built session.
    Unknown,
    /// Idle, safe to start a new segment.
    Ready,
    /// A segment is being captured.
    Recording,
    /// Every captured segment is merged into the target.
    Paused,
}

/// Operations that move a session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Begin capturing a new segment.
    Start,
    /// Finalize the current segment and merge it into the target.
    Pause,
}

impl Operation {
    /// Whether the state machine defines this operation from `status`.
    pub fn permitted_from(self, status: SessionStatus) -> bool {
        matches!(
            (self, status),
            (Operation::Start, SessionStatus::Ready)
                | (Operation::Start, SessionStatus::Paused)
                | (Operation::Pause, SessionStatus::Recording)
        )
    }

    /// Status committed when the operation succeeds.
    pub fn success_status(self) -> SessionStatus {
        match self {
            Operation::Start => SessionStatus::Recording,
            Operation::Pause => SessionStatus::Paused,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Unknown => "unknown",
            SessionStatus::Ready => "ready",
            SessionStatus::Recording => "recording",
            SessionStatus::Paused => "paused",
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Pause => "pause",
        })
    }
}

//! Error types for routing and configuration.

use thiserror::Error;

/// A port could not be opened by [`Router::start`](crate::router::Router::start).
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("MIDI {direction} port '{port}' not found")]
    NotFound { direction: Direction, port: String },

    #[error("failed to connect MIDI {direction} port '{port}': {reason}")]
    Connect {
        direction: Direction,
        port: String,
        reason: String,
    },

    #[error("failed to initialise MIDI {0}: {1}")]
    Init(Direction, String),
}

impl OpenError {
    pub fn direction(&self) -> Direction {
        match self {
            OpenError::NotFound { direction, .. } => *direction,
            OpenError::Connect { direction, .. } => *direction,
            OpenError::Init(direction, _) => *direction,
        }
    }
}

/// Which side of the route an [`OpenError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Sending one drained message to the output failed.
#[derive(Error, Debug)]
#[error("failed to send MIDI message: {0}")]
pub struct ForwardError(pub String);

/// Polling the input for pending messages failed.
#[derive(Error, Debug)]
#[error("failed to poll MIDI input: {0}")]
pub struct PollError(pub String);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The system tray icon could not be created.
#[derive(Error, Debug)]
#[error("tray icon unavailable: {0}")]
pub struct TrayError(pub String);

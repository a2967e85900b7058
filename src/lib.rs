//! RIDI — forwards MIDI messages verbatim from one input port to one output port.
//!
//! The [`Router`] owns the two open ports and a worker thread that polls the
//! input and forwards every pending message. Everything else here is the
//! desktop shell around it: the midir transport, JSON configuration, themes,
//! the tray icon and the egui window.

pub mod app;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod midi;
pub mod port;
pub mod router;
pub mod theme;
pub mod tray;

#[cfg(test)]
mod testing;

pub use backend::MidirSubsystem;
pub use error::{ConfigError, ForwardError, OpenError, PollError, TrayError};
pub use midi::MidiMessage;
pub use port::{InputPort, MidiSubsystem, OutputPort, PortId};
pub use router::{LogOnly, LogSink, Router, RouterState, StopOutcome};

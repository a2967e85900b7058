//! The MIDI subsystem contract the router is written against.
//!
//! [`MidirSubsystem`](crate::backend::MidirSubsystem) is the real transport;
//! tests substitute an in-memory implementation.

use crate::error::{ForwardError, OpenError, PollError};
use crate::midi::MidiMessage;

/// Port name as reported by the transport. Compared by exact string match.
pub type PortId = String;

/// Enumerates and opens MIDI endpoints.
pub trait MidiSubsystem {
    type Input: InputPort + Send + 'static;
    type Output: OutputPort + Send + 'static;

    fn list_input_ports(&self) -> Vec<PortId>;

    fn list_output_ports(&self) -> Vec<PortId>;

    /// Open an input port exclusively. Dropping the handle releases the port.
    fn open_input(&self, port: &str) -> Result<Self::Input, OpenError>;

    /// Open an output port exclusively. Dropping the handle releases the port.
    fn open_output(&self, port: &str) -> Result<Self::Output, OpenError>;
}

pub trait InputPort {
    /// Take every message received since the last call, oldest first.
    /// Must not block.
    fn poll_pending(&mut self) -> Result<Vec<MidiMessage>, PollError>;
}

pub trait OutputPort {
    fn send(&mut self, message: &MidiMessage) -> Result<(), ForwardError>;
}

//! MIDI backend using midir — port enumeration and exclusive connections.
//!
//! midir delivers input through a callback on its own thread. The callback
//! pushes each message into a channel which [`MidirInput::poll_pending`]
//! drains, giving the router the non-blocking polling contract it expects.

use crossbeam_channel::{Receiver, TryRecvError};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::{Direction, ForwardError, OpenError, PollError};
use crate::midi::MidiMessage;
use crate::port::{InputPort, MidiSubsystem, OutputPort, PortId};

const CLIENT_NAME: &str = "RIDI";

/// The system MIDI transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct MidirSubsystem;

impl MidirSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl MidiSubsystem for MidirSubsystem {
    type Input = MidirInput;
    type Output = MidirOutput;

    fn list_input_ports(&self) -> Vec<PortId> {
        let Ok(midi_in) = MidiInput::new("RIDI Input Probe") else {
            return Vec::new();
        };
        midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect()
    }

    fn list_output_ports(&self) -> Vec<PortId> {
        let Ok(midi_out) = MidiOutput::new("RIDI Output Probe") else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }

    fn open_input(&self, port_name: &str) -> Result<MidirInput, OpenError> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|e| OpenError::Init(Direction::Input, e.to_string()))?;
        // Forward everything, including SysEx and clock.
        midi_in.ignore(Ignore::None);

        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| midi_in.port_name(p).as_deref() == Ok(port_name))
            .ok_or_else(|| OpenError::NotFound {
                direction: Direction::Input,
                port: port_name.to_string(),
            })?;

        let (tx, rx) = crossbeam_channel::unbounded::<MidiMessage>();

        let connection = midi_in
            .connect(
                &port,
                "RIDI Input",
                move |_timestamp, data, _| {
                    let _ = tx.send(MidiMessage::from(data));
                },
                (),
            )
            .map_err(|e| OpenError::Connect {
                direction: Direction::Input,
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("[Backend] Opened input: {port_name}");
        Ok(MidirInput {
            connection: Some(connection),
            pending: rx,
            name: port_name.to_string(),
        })
    }

    fn open_output(&self, port_name: &str) -> Result<MidirOutput, OpenError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| OpenError::Init(Direction::Output, e.to_string()))?;

        let port = midi_out
            .ports()
            .into_iter()
            .find(|p| midi_out.port_name(p).as_deref() == Ok(port_name))
            .ok_or_else(|| OpenError::NotFound {
                direction: Direction::Output,
                port: port_name.to_string(),
            })?;

        let connection = midi_out
            .connect(&port, "RIDI Output")
            .map_err(|e| OpenError::Connect {
                direction: Direction::Output,
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("[Backend] Opened output: {port_name}");
        Ok(MidirOutput {
            connection: Some(connection),
            name: port_name.to_string(),
        })
    }
}

/// An open midir input. Dropping it closes the connection.
pub struct MidirInput {
    connection: Option<MidiInputConnection<()>>,
    pending: Receiver<MidiMessage>,
    name: String,
}

impl InputPort for MidirInput {
    fn poll_pending(&mut self) -> Result<Vec<MidiMessage>, PollError> {
        let mut drained = Vec::new();
        loop {
            match self.pending.try_recv() {
                Ok(msg) => drained.push(msg),
                Err(TryRecvError::Empty) => return Ok(drained),
                // Only possible once the connection (and its callback) is gone.
                Err(TryRecvError::Disconnected) if drained.is_empty() => {
                    return Err(PollError(format!("input '{}' disconnected", self.name)));
                }
                Err(TryRecvError::Disconnected) => return Ok(drained),
            }
        }
    }
}

impl Drop for MidirInput {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::debug!("[Backend] Closed input: {}", self.name);
        }
    }
}

/// An open midir output. Dropping it closes the connection.
pub struct MidirOutput {
    connection: Option<MidiOutputConnection>,
    name: String,
}

impl OutputPort for MidirOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<(), ForwardError> {
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| ForwardError(format!("output '{}' is closed", self.name)))?;
        conn.send(message.as_bytes())
            .map_err(|e| ForwardError(e.to_string()))
    }
}

impl Drop for MidirOutput {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::debug!("[Backend] Closed output: {}", self.name);
        }
    }
}

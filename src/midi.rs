use std::fmt;

/// A single raw MIDI message, forwarded verbatim.
///
/// The bytes are never interpreted for routing. [`fmt::Display`] decodes the
/// common channel-voice messages so the event log reads like
/// `note_on channel=0 note=60 velocity=100`; everything else is shown as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiMessage {
    bytes: Vec<u8>,
}

impl MidiMessage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new([0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new([0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    pub fn control_change(channel: u8, cc: u8, value: u8) -> Self {
        Self::new([0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&[u8]> for MidiMessage {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for MidiMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.bytes.as_slice();
        let Some(&status) = data.first() else {
            return f.write_str("<empty>");
        };
        let channel = status & 0x0F;

        match (status & 0xF0, data.len()) {
            (0x80, 3..) => write!(
                f,
                "note_off channel={channel} note={} velocity={}",
                data[1], data[2]
            ),
            (0x90, 3..) => write!(
                f,
                "note_on channel={channel} note={} velocity={}",
                data[1], data[2]
            ),
            (0xA0, 3..) => write!(
                f,
                "polytouch channel={channel} note={} value={}",
                data[1], data[2]
            ),
            (0xB0, 3..) => write!(
                f,
                "control_change channel={channel} control={} value={}",
                data[1], data[2]
            ),
            (0xC0, 2..) => write!(f, "program_change channel={channel} program={}", data[1]),
            (0xD0, 2..) => write!(f, "aftertouch channel={channel} value={}", data[1]),
            (0xE0, 3..) => {
                // 14-bit, centred on 0
                let value = (((data[2] as i32) << 7) | data[1] as i32) - 8192;
                write!(f, "pitchwheel channel={channel} pitch={value}")
            }
            _ => {
                f.write_str("bytes")?;
                for b in data {
                    write!(f, " {b:02X}")?;
                }
                Ok(())
            }
        }
    }
}

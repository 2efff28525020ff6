use std::time::{Duration, Instant};

/// Errors raised while opening or reading a MIDI input
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("MIDI initialization error: {0}")]
    Init(String),
    #[error("MIDI input port not found: {0}")]
    PortNotFound(String),
    #[error("MIDI connection error: {0}")]
    Connection(String),
    #[error("MIDI input disconnected")]
    Disconnected,
}

/// A parsed MIDI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On with a non-zero velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off, including Note On with velocity 0
    NoteOff { channel: u8, note: u8, velocity: u8 },
    PolyPressure { channel: u8, note: u8, pressure: u8 },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend, centered on 8192
    PitchBend { channel: u8, value: u16 },
    Clock,
    Start,
    Stop,
    Continue,
}

impl MidiMessage {
    /// Only Note On counts as a tempo tap.
    pub fn is_tap(&self) -> bool {
        matches!(self, MidiMessage::NoteOn { .. })
    }
}

/// A message together with the moment it arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    pub at: Instant,
    pub message: MidiMessage,
}

impl TimedMessage {
    pub fn new(at: Instant, message: MidiMessage) -> Self {
        Self { at, message }
    }
}

pub type Result<T> = std::result::Result<T, MidiError>;

/// Parses one complete MIDI message. System exclusive and unknown status
/// bytes yield `None`.
pub fn parse_midi_message(data: &[u8]) -> Option<MidiMessage> {
    let status = *data.first()?;
    let channel = status & 0x0F;

    match status & 0xF0 {
        0x90 if data.len() >= 3 && data[2] > 0 => Some(MidiMessage::NoteOn {
            channel,
            note: data[1],
            velocity: data[2],
        }),
        0x80 | 0x90 if data.len() >= 3 => Some(MidiMessage::NoteOff {
            channel,
            note: data[1],
            velocity: data[2],
        }),
        0xA0 if data.len() >= 3 => Some(MidiMessage::PolyPressure {
            channel,
            note: data[1],
            pressure: data[2],
        }),
        0xB0 if data.len() >= 3 => Some(MidiMessage::ControlChange {
            channel,
            controller: data[1],
            value: data[2],
        }),
        0xC0 if data.len() >= 2 => Some(MidiMessage::ProgramChange {
            channel,
            program: data[1],
        }),
        0xD0 if data.len() >= 2 => Some(MidiMessage::ChannelPressure {
            channel,
            pressure: data[1],
        }),
        0xE0 if data.len() >= 3 => Some(MidiMessage::PitchBend {
            channel,
            value: u16::from(data[1] & 0x7F) | (u16::from(data[2] & 0x7F) << 7),
        }),
        0xF0 => match status {
            0xF8 => Some(MidiMessage::Clock),
            0xFA => Some(MidiMessage::Start),
            0xFB => Some(MidiMessage::Continue),
            0xFC => Some(MidiMessage::Stop),
            _ => None,
        },
        _ => None,
    }
}

/// Source of incoming MIDI messages
pub trait MidiEngine {
    /// Waits up to `timeout` for the next message. `Ok(None)` means nothing
    /// arrived in time.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<TimedMessage>>;
}

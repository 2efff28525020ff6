use crate::midi::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Replays a fixed script of messages, then either idles or disconnects.
#[derive(Debug, Default)]
pub struct MockMidiEngine {
    script: VecDeque<TimedMessage>,
    disconnect_when_drained: bool,
}

impl MockMidiEngine {
    pub fn new(messages: impl IntoIterator<Item = TimedMessage>) -> Self {
        Self {
            script: messages.into_iter().collect(),
            disconnect_when_drained: false,
        }
    }

    /// One Note-On per instant.
    pub fn from_taps(taps: impl IntoIterator<Item = Instant>) -> Self {
        Self::new(taps.into_iter().map(|at| {
            TimedMessage::new(
                at,
                MidiMessage::NoteOn {
                    channel: 0,
                    note: 36,
                    velocity: 100,
                },
            )
        }))
    }

    /// Report a disconnect once every scripted message has been delivered.
    pub fn disconnect_when_drained(mut self) -> Self {
        self.disconnect_when_drained = true;
        self
    }
}

impl MidiEngine for MockMidiEngine {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<TimedMessage>> {
        if let Some(message) = self.script.pop_front() {
            return Ok(Some(message));
        }
        if self.disconnect_when_drained {
            return Err(MidiError::Disconnected);
        }
        thread::sleep(timeout);
        Ok(None)
    }
}

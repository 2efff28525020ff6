//! MIDI ingestion for tapsyncrs
//!
//! This module turns incoming MIDI into tempo taps:
//! - Message types, parsing and error handling
//! - Real input ports via midir
//! - A scripted engine for tests
//! - The ingestion loop feeding the tap clock
//!
mod engine;
mod input;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{parse_midi_message, MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
pub use input::{run_midi_input, INPUT_POLL};
pub use midir_engine::{list_input_ports, MidirEngine};
pub use mock_engine::MockMidiEngine;

pub type DefaultMidiEngine = MidirEngine;

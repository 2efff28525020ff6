use crate::midi::{MidiEngine, MidiMessage, TimedMessage};
use crate::session::SharedSession;
use crate::tap_clock::TapClock;
use crate::tap_window::TapEvent;
use log::{debug, error, info};
use std::time::Duration;

/// How long a single receive may block before the running flag is re-checked.
pub const INPUT_POLL: Duration = Duration::from_millis(50);

/// Reads MIDI until the session stops or the input goes away, turning every
/// Note-On into a tap. A failing input stops the whole session.
pub fn run_midi_input<E: MidiEngine>(mut engine: E, session: SharedSession, mut clock: TapClock) {
    info!("MIDI input loop started");

    while session.is_running() {
        match engine.recv_timeout(INPUT_POLL) {
            Ok(Some(timed)) => handle_message(&session, &mut clock, timed),
            Ok(None) => {}
            Err(err) => {
                error!("MIDI input stopped: {}", err);
                session.shutdown();
                break;
            }
        }
    }

    info!(
        "MIDI input loop finished after {} taps",
        clock.taps_recorded()
    );
}

fn handle_message(session: &SharedSession, clock: &mut TapClock, timed: TimedMessage) {
    if timed.message.is_tap() {
        debug!("Tap: {:?}", timed.message);
        session.on_tap(clock, TapEvent::new(timed.at));
    } else if !matches!(timed.message, MidiMessage::NoteOff { .. }) {
        debug!("Non-note message received: {:?}", timed.message);
    }
}

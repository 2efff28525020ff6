use std::thread;
use std::time::{Duration, Instant};
use tapsyncrs::midi::{
    parse_midi_message, run_midi_input, MidiEngine, MidiError, MidiMessage, MockMidiEngine,
    TimedMessage,
};
use tapsyncrs::session::SchedulerPhase;
use tapsyncrs::{create_session, TapClock};

#[test]
fn test_note_messages_parsing() {
    assert_eq!(
        parse_midi_message(&[0x90, 60, 100]),
        Some(MidiMessage::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100
        })
    );
    assert_eq!(
        parse_midi_message(&[0x83, 60, 64]),
        Some(MidiMessage::NoteOff {
            channel: 3,
            note: 60,
            velocity: 64
        })
    );
}

#[test]
fn test_note_on_with_zero_velocity_is_note_off() {
    let parsed = parse_midi_message(&[0x99, 36, 0]);
    assert_eq!(
        parsed,
        Some(MidiMessage::NoteOff {
            channel: 9,
            note: 36,
            velocity: 0
        })
    );
    assert!(!parsed.unwrap().is_tap());
}

#[test]
fn test_channel_messages_parsing() {
    assert_eq!(
        parse_midi_message(&[0xB1, 7, 100]),
        Some(MidiMessage::ControlChange {
            channel: 1,
            controller: 7,
            value: 100
        })
    );
    assert_eq!(
        parse_midi_message(&[0xC2, 42]),
        Some(MidiMessage::ProgramChange {
            channel: 2,
            program: 42
        })
    );
    assert_eq!(
        parse_midi_message(&[0xD0, 90]),
        Some(MidiMessage::ChannelPressure {
            channel: 0,
            pressure: 90
        })
    );
    assert_eq!(
        parse_midi_message(&[0xA0, 60, 30]),
        Some(MidiMessage::PolyPressure {
            channel: 0,
            note: 60,
            pressure: 30
        })
    );
    assert_eq!(
        parse_midi_message(&[0xE0, 0x00, 0x40]),
        Some(MidiMessage::PitchBend {
            channel: 0,
            value: 8192
        })
    );
}

#[test]
fn test_system_message_parsing() {
    assert_eq!(parse_midi_message(&[0xF8]), Some(MidiMessage::Clock));
    assert_eq!(parse_midi_message(&[0xFA]), Some(MidiMessage::Start));
    assert_eq!(parse_midi_message(&[0xFB]), Some(MidiMessage::Continue));
    assert_eq!(parse_midi_message(&[0xFC]), Some(MidiMessage::Stop));
}

#[test]
fn test_unsupported_and_truncated_messages() {
    assert_eq!(parse_midi_message(&[]), None);
    assert_eq!(parse_midi_message(&[0xF0, 0x7E, 0xF7]), None);
    assert_eq!(parse_midi_message(&[0x90, 60]), None);
    assert_eq!(parse_midi_message(&[0x3C]), None);
}

#[test]
fn test_midi_error_display() {
    assert_eq!(
        MidiError::PortNotFound("X1".to_string()).to_string(),
        "MIDI input port not found: X1"
    );
    assert_eq!(MidiError::Disconnected.to_string(), "MIDI input disconnected");
}

#[test]
fn test_mock_engine_replays_script() {
    let at = Instant::now();
    let mut engine = MockMidiEngine::new(vec![TimedMessage::new(at, MidiMessage::Start)])
        .disconnect_when_drained();

    let received = engine.recv_timeout(Duration::from_millis(1)).unwrap();
    assert_eq!(received, Some(TimedMessage::new(at, MidiMessage::Start)));
    assert!(matches!(
        engine.recv_timeout(Duration::from_millis(1)),
        Err(MidiError::Disconnected)
    ));
}

#[test]
fn test_mock_engine_times_out_when_idle() {
    let mut engine = MockMidiEngine::default();
    assert_eq!(engine.recv_timeout(Duration::from_millis(5)).unwrap(), None);
}

#[test]
fn test_ingestion_sets_period_from_taps() {
    let base = Instant::now();
    let engine =
        MockMidiEngine::from_taps((0..16).map(|i| base + Duration::from_millis(i * 500)))
            .disconnect_when_drained();
    let session = create_session();

    run_midi_input(engine, session.clone(), TapClock::default());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.taps, 16);
    assert_eq!(snapshot.period.as_millis(), 500);
    assert_eq!(snapshot.period.bpm(), Some(120.0));
    assert_eq!(snapshot.phase, SchedulerPhase::Armed);
    // A disconnected input stops the whole session.
    assert!(!session.is_running());
}

#[test]
fn test_ingestion_ignores_non_tap_messages() {
    let at = Instant::now();
    let engine = MockMidiEngine::new(vec![
        TimedMessage::new(
            at,
            MidiMessage::NoteOff {
                channel: 0,
                note: 36,
                velocity: 0,
            },
        ),
        TimedMessage::new(
            at,
            MidiMessage::ControlChange {
                channel: 0,
                controller: 1,
                value: 64,
            },
        ),
        TimedMessage::new(at, MidiMessage::Clock),
    ])
    .disconnect_when_drained();
    let session = create_session();

    run_midi_input(engine, session.clone(), TapClock::default());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.taps, 0);
    assert_eq!(snapshot.phase, SchedulerPhase::Idle);
}

#[test]
fn test_ingestion_skips_zero_velocity_note_on() {
    let at = Instant::now();
    let released = parse_midi_message(&[0x90, 36, 0]).unwrap();
    let pressed = parse_midi_message(&[0x90, 36, 100]).unwrap();
    let engine = MockMidiEngine::new(vec![
        TimedMessage::new(at, pressed),
        TimedMessage::new(at, released),
        TimedMessage::new(at, pressed),
        TimedMessage::new(at, released),
    ])
    .disconnect_when_drained();
    let session = create_session();

    run_midi_input(engine, session.clone(), TapClock::default());

    assert_eq!(session.snapshot().taps, 2);
}

#[test]
fn test_ingestion_stops_with_session() {
    let session = create_session();
    let loop_session = session.clone();
    let handle = thread::spawn(move || {
        run_midi_input(MockMidiEngine::default(), loop_session, TapClock::default());
    });

    thread::sleep(Duration::from_millis(20));
    session.shutdown();
    handle.join().unwrap();
}

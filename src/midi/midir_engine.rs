use crate::midi::{parse_midi_message, MidiEngine, MidiError, Result, TimedMessage};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::time::{Duration, Instant};

const CLIENT_NAME: &str = "tapsyncrs-in";

pub struct MidirEngine {
    _connection: MidiInputConnection<()>,
    rx: Receiver<(Instant, Vec<u8>)>,
    port_name: String,
}

impl MidirEngine {
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|err| MidiError::Init(err.to_string()))?;
        midi_in.ignore(Ignore::All);

        let in_ports = midi_in.ports();
        debug!("Available MIDI input ports:");
        for port in &in_ports {
            if let Ok(port_name) = midi_in.port_name(port) {
                debug!("  - {}", port_name);
            }
        }

        let in_port = match device_name {
            Some(name) => in_ports.iter().find(|port| {
                midi_in
                    .port_name(port)
                    .map(|port_name| port_name.contains(name))
                    .unwrap_or(false)
            }),
            None => in_ports.first(),
        }
        .cloned()
        .ok_or_else(|| MidiError::PortNotFound(device_name.unwrap_or("<any>").to_string()))?;

        let port_name = midi_in
            .port_name(&in_port)
            .unwrap_or_else(|_| "<unknown>".into());

        let (tx, rx) = channel::unbounded();
        let connection = midi_in
            .connect(
                &in_port,
                "tapsyncrs-input",
                move |_stamp, message, _| {
                    let _ = tx.send((Instant::now(), message.to_vec()));
                },
                (),
            )
            .map_err(|err| MidiError::Connection(err.to_string()))?;

        info!("Connected to MIDI input: {}", port_name);
        Ok(Self {
            _connection: connection,
            rx,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiEngine for MidirEngine {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<TimedMessage>> {
        match self.rx.recv_timeout(timeout) {
            Ok((at, bytes)) => match parse_midi_message(&bytes) {
                Some(message) => Ok(Some(TimedMessage::new(at, message))),
                None => {
                    debug!("Ignoring unsupported MIDI message: {:02X?}", bytes);
                    Ok(None)
                }
            },
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(MidiError::Disconnected),
        }
    }
}

pub fn list_input_ports() -> Vec<String> {
    match MidiInput::new("tapsyncrs-list") {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect(),
        Err(err) => {
            log::error!("Failed to initialize MIDI input: {}", err);
            Vec::new()
        }
    }
}

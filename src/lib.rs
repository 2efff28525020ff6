pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod midi;
pub mod playback;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod tap_clock;
pub mod tap_window;
pub mod ui;

pub use cli::{validate_device, Args};
pub use error::AppError;
pub use scheduler::BeatScheduler;
pub use session::{Session, SharedSession};
pub use spawner::{Spawner, ThreadSpawner};
pub use tap_clock::{BeatPeriod, TapClock, TempoConfig};
pub use tap_window::TapEvent;

pub fn create_spawner() -> ThreadSpawner {
    ThreadSpawner::new()
}

pub fn create_session() -> SharedSession {
    Session::shared()
}

/// Ctrl-C stops the session the same way `q` does, so workers are joined.
pub fn install_interrupt_handler(session: SharedSession) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(interrupt_handler(session))
}

pub fn interrupt_handler(session: SharedSession) -> impl FnMut() + Send + 'static {
    move || {
        log::info!("Interrupt received");
        session.shutdown();
    }
}

/// MIDI input ports followed by audio output devices.
pub struct DeviceList {
    pub midi_inputs: Vec<String>,
    pub audio_outputs: Vec<String>,
}

pub fn handle_device_list() -> DeviceList {
    DeviceList {
        midi_inputs: midi::list_input_ports(),
        audio_outputs: playback::list_output_devices(),
    }
}

use crate::config::SettingsError;
use crate::midi::MidiError;
use crate::playback::PlaybackError;

/// Everything that can stop the player from starting.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Midi(#[from] MidiError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to install Ctrl-C handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
    #[error("{0}")]
    Device(String),
    #[error("no sample file given")]
    MissingSample,
}

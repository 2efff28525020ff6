mod cpal_output;
mod wav;

pub use cpal_output::{list_output_devices, CpalPlayback};
pub use wav::WavSample;

use log::info;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to read sample {}: {source}", path.display())]
    Sample {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("sample {} contains no audio frames", .0.display())]
    EmptySample(PathBuf),
    #[error("no audio output device matching \"{0}\" was found")]
    DeviceNotFound(String),
    #[error("audio device error: {0}")]
    Device(String),
    #[error("audio device uses unsupported sample format {0}")]
    UnsupportedFormat(String),
    #[error("playback did not finish within {0:?}")]
    Timeout(Duration),
}

/// Something that can play the configured sample once.
pub trait Playback: Send {
    fn trigger(&mut self) -> Result<(), PlaybackError>;
}

impl<P: Playback + ?Sized> Playback for Box<P> {
    fn trigger(&mut self) -> Result<(), PlaybackError> {
        (**self).trigger()
    }
}

/// Logs each beat instead of producing sound.
#[derive(Debug, Clone)]
pub struct LogPlayback {
    label: String,
    beats: u64,
}

impl LogPlayback {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            beats: 0,
        }
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }
}

impl Playback for LogPlayback {
    fn trigger(&mut self) -> Result<(), PlaybackError> {
        self.beats += 1;
        info!("Beat {}: {}", self.beats, self.label);
        Ok(())
    }
}

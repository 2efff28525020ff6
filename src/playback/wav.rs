use super::PlaybackError;
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A WAV file decoded into interleaved f32 samples in [-1, 1].
#[derive(Debug, Clone)]
pub struct WavSample {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl WavSample {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PlaybackError> {
        let path = path.as_ref();
        let to_error = |source: hound::Error| PlaybackError::Sample {
            path: path.to_path_buf(),
            source,
        };

        let reader = WavReader::open(path).map_err(to_error)?;
        let sample = Self::from_reader(reader).map_err(to_error)?;
        if sample.frames() == 0 {
            return Err(PlaybackError::EmptySample(path.to_path_buf()));
        }

        log::info!(
            "Loaded sample {} ({} ch, {} Hz, {:?})",
            path.display(),
            sample.channels,
            sample.sample_rate,
            sample.duration()
        );
        Ok(sample)
    }

    pub fn from_reader<R: Read>(mut reader: WavReader<R>) -> Result<Self, hound::Error> {
        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            samples: samples.into(),
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / usize::from(self.channels)
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

use super::{Playback, PlaybackError, WavSample};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{self, Sender};
use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;

/// Extra time allowed past the sample length before a trigger gives up.
const PLAYBACK_GRACE: Duration = Duration::from_millis(250);

/// Plays a decoded sample on a cpal output device.
///
/// The stream is opened per trigger at the sample's own channel count and
/// rate; devices that cannot run that configuration fail the trigger.
pub struct CpalPlayback {
    sample: WavSample,
    device_name: Option<String>,
}

impl CpalPlayback {
    pub fn new(sample: WavSample, device_name: Option<String>) -> Result<Self, PlaybackError> {
        let device = find_device(device_name.as_deref())?;
        log::info!(
            "Using audio output: {}",
            device.name().unwrap_or_else(|_| "<unknown>".into())
        );
        Ok(Self {
            sample,
            device_name,
        })
    }
}

impl Playback for CpalPlayback {
    fn trigger(&mut self) -> Result<(), PlaybackError> {
        let device = find_device(self.device_name.as_deref())?;
        let supported = device
            .default_output_config()
            .map_err(|err| PlaybackError::Device(err.to_string()))?;

        let config = cpal::StreamConfig {
            channels: self.sample.channels(),
            sample_rate: cpal::SampleRate(self.sample.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        let (done_tx, done_rx) = channel::bounded(1);
        let samples = self.sample.samples();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, done_tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, done_tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, done_tx)?,
            other => return Err(PlaybackError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream
            .play()
            .map_err(|err| PlaybackError::Device(err.to_string()))?;

        let limit = self.sample.duration() + PLAYBACK_GRACE;
        let result = done_rx
            .recv_timeout(limit)
            .map_err(|_| PlaybackError::Timeout(limit));
        debug!("Sample written to output ({:?})", self.sample.duration());
        drop(stream);
        result
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<[f32]>,
    done: Sender<()>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut position = 0;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for out in data.iter_mut() {
                    *out = match samples.get(position) {
                        Some(&sample) => {
                            position += 1;
                            T::from_sample(sample)
                        }
                        None => T::EQUILIBRIUM,
                    };
                }
                if position >= samples.len() {
                    let _ = done.try_send(());
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|err| PlaybackError::Device(err.to_string()))
}

fn find_device(name: Option<&str>) -> Result<cpal::Device, PlaybackError> {
    let host = cpal::default_host();
    match name {
        None => host
            .default_output_device()
            .ok_or_else(|| PlaybackError::DeviceNotFound("default".to_string())),
        Some(name) => host
            .output_devices()
            .map_err(|err| PlaybackError::Device(err.to_string()))?
            .find(|device| {
                device
                    .name()
                    .map(|device_name| device_name.contains(name))
                    .unwrap_or(false)
            })
            .ok_or_else(|| PlaybackError::DeviceNotFound(name.to_string())),
    }
}

pub fn list_output_devices() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|device| device.name().ok()).collect(),
        Err(err) => {
            error!("Failed to enumerate audio outputs: {}", err);
            Vec::new()
        }
    }
}

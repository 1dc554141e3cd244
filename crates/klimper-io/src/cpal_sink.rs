//! Host audio device sink built on cpal.
//!
//! The output callback plays the [`PeriodRing`] like a DMA engine would:
//! sample by sample, wrapping at the end, raising the interrupt every time it
//! crosses a period boundary.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};

use crate::interrupt::InterruptHandler;
use crate::pcm;
use crate::ring::PeriodRing;
use crate::sink::AudioSink;
use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

/// List all output devices of the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    let mut devices = Vec::new();
    for device in outputs {
        if let Ok(name) = device_name(&device) {
            let default_sample_rate = device
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(44100);
            let is_default = default_name.as_deref() == Some(name.as_str());
            devices.push(AudioDevice {
                name,
                default_sample_rate,
                is_default,
            });
        }
    }

    Ok(devices)
}

/// Find an output device by index or case-insensitive partial name, or the default.
fn find_output_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    let Some(search) = name_or_index else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = search.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    let search_lower = search.to_lowercase();
    devices
        .into_iter()
        .find(|d| device_name(d).is_ok_and(|n| n.to_lowercase().contains(&search_lower)))
        .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{}'", search)))
}

/// Plays the ring and raises the interrupt at period boundaries.
struct DmaEmulator {
    ring: Arc<PeriodRing>,
    interrupt: InterruptHandler,
    position: usize,
}

impl DmaEmulator {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let sample = pcm::to_f32(self.ring.load(self.position));
        self.position += 1;

        let period = self.ring.period_len();
        if self.position % period == 0 {
            let finished = self.position / period - 1;
            self.interrupt
                .on_buffer_consumed(self.ring.descriptor(finished));
            if self.position >= self.ring.len() {
                self.position = 0;
            }
        }
        sample
    }

    fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels) {
            let left = self.next_sample();
            let right = self.next_sample();
            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}

/// cpal output stream playing the period ring.
pub struct CpalSink {
    device: Option<String>,
    sample_rate: u32,
    stream: Option<Stream>,
}

impl CpalSink {
    /// Create a sink for the device matching `device` (default if `None`).
    pub fn new(device: Option<String>, sample_rate: u32) -> Self {
        Self {
            device,
            sample_rate,
            stream: None,
        }
    }

    /// Whether the stream is running.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

impl AudioSink for CpalSink {
    fn start(&mut self, ring: Arc<PeriodRing>, interrupt: InterruptHandler) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AlreadyStarted);
        }

        let host = cpal::default_host();
        let device = find_output_device(&host, self.device.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "<unknown>".into());

        let channels = device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2)
            .max(1);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let mut dma = DmaEmulator {
            ring,
            interrupt,
            position: 0,
        };
        let channel_count = usize::from(channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    dma.fill(data, channel_count);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels,
            sample_rate = self.sample_rate,
            "output stream started"
        );

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!("output stream stopped");
        }
    }

    fn name(&self) -> &'static str {
        "cpal"
    }
}

impl std::fmt::Debug for CpalSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalSink")
            .field("device", &self.device)
            .field("sample_rate", &self.sample_rate)
            .field("running", &self.is_running())
            .finish()
    }
}

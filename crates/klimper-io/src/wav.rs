//! 16-bit PCM WAV output for offline renders.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::Result;

/// Streaming writer for interleaved 16-bit PCM.
pub struct PcmWavWriter {
    writer: WavWriter<BufWriter<File>>,
    samples_written: u64,
}

impl PcmWavWriter {
    /// Create `path` for `channels`-channel audio at `sample_rate`.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path.as_ref(), spec)?;
        tracing::debug!(path = %path.as_ref().display(), sample_rate, channels, "wav file created");
        Ok(Self {
            writer,
            samples_written: 0,
        })
    }

    /// Append interleaved samples.
    pub fn write(&mut self, samples: &[i16]) -> Result<()> {
        for &sample in samples {
            self.writer.write_sample(sample)?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Samples written so far.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Flush and fix up the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl std::fmt::Debug for PcmWavWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmWavWriter")
            .field("spec", &self.writer.spec())
            .field("samples_written", &self.samples_written)
            .finish()
    }
}

/// Read a 16-bit integer WAV file as interleaved samples.
pub fn read_wav_pcm16<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, spec))
}

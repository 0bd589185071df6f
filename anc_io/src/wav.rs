use std::path::Path;

use micro_anc::Sample;

use crate::error::{WavError, WavResult};

/// Interleaved integer PCM samples as stored in a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Interleaved samples at their original bit depth.
    pub samples: Vec<i32>,
}

impl WavAudio {
    /// Number of samples per channel.
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// Reads an integer PCM WAV file with 8, 16, 24 or 32 bits per sample.
pub fn read_wav<P: AsRef<Path>>(path: P) -> WavResult<WavAudio> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    log::debug!(
        "Reading {}: {} Hz, {}-bit, {} channel(s)",
        path.display(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.channels
    );

    if spec.sample_format != hound::SampleFormat::Int {
        return Err(WavError::UnsupportedFormat(
            "only integer PCM is supported, got floating point samples".into(),
        ));
    }
    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(WavError::UnsupportedFormat(format!(
            "{} bits per sample",
            spec.bits_per_sample
        )));
    }

    let samples = reader
        .into_samples::<i32>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        samples,
    })
}

/// Writes interleaved 16 bit samples. Other bit depths are rejected.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    samples: &[Sample],
) -> WavResult<()> {
    if bits_per_sample != 16 {
        return Err(WavError::UnsupportedFormat(format!(
            "writing {} bits per sample",
            bits_per_sample
        )));
    }
    if channels == 0 || samples.len() % channels as usize != 0 {
        return Err(WavError::Malformed(format!(
            "{} samples do not form whole frames of {} channel(s)",
            samples.len(),
            channels
        )));
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for sample in samples.iter() {
        writer.write_sample(*sample)?;
    }
    // Writes the final chunk sizes to the header.
    writer.finalize()?;
    log::debug!(
        "Wrote {} samples to {}",
        samples.len(),
        path.as_ref().display()
    );
    Ok(())
}

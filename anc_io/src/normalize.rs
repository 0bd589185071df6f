use std::path::Path;

use micro_anc::common::to_sample;
use micro_anc::Sample;

use crate::error::{WavError, WavResult};
use crate::wav::{read_wav, WavAudio};

/// The sample rate all engine input is converted to.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Converts `audio` to mono, 16 bit, 44.1 kHz.
///
/// Only the first channel is kept, the others are discarded. Samples are
/// shifted to 16 bits and resampled by linear interpolation if the sample
/// rate differs from [`TARGET_SAMPLE_RATE`].
pub fn normalize(audio: &WavAudio) -> WavResult<Vec<Sample>> {
    if audio.channels == 0 {
        return Err(WavError::Malformed("zero channels".into()));
    }
    if audio.sample_rate == 0 {
        return Err(WavError::Malformed("zero sample rate".into()));
    }
    if !(1..=32).contains(&audio.bits_per_sample) {
        return Err(WavError::UnsupportedFormat(format!(
            "{} bits per sample",
            audio.bits_per_sample
        )));
    }

    let first_channel: Vec<Sample> = audio
        .samples
        .iter()
        .step_by(audio.channels as usize)
        .map(|sample| to_16_bit(*sample, audio.bits_per_sample))
        .collect();

    if audio.sample_rate == TARGET_SAMPLE_RATE {
        return Ok(first_channel);
    }
    log::debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        first_channel.len(),
        audio.sample_rate,
        TARGET_SAMPLE_RATE
    );
    Ok(resample_linear(
        &first_channel,
        audio.sample_rate,
        TARGET_SAMPLE_RATE,
    ))
}

/// Reads a WAV file and normalizes it, see [`normalize`].
pub fn read_signal<P: AsRef<Path>>(path: P) -> WavResult<Vec<Sample>> {
    normalize(&read_wav(path)?)
}

fn to_16_bit(sample: i32, bits_per_sample: u16) -> Sample {
    let scaled = if bits_per_sample < 16 {
        sample << (16 - bits_per_sample)
    } else {
        sample >> (bits_per_sample - 16)
    };
    scaled.clamp(Sample::MIN as i32, Sample::MAX as i32) as Sample
}

/// Linear interpolation from `from_rate` to `to_rate`. The output has
/// `round(len · to_rate / from_rate)` samples.
pub fn resample_linear(samples: &[Sample], from_rate: u32, to_rate: u32) -> Vec<Sample> {
    if samples.is_empty() || from_rate == to_rate {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|n| {
            let position = n as f64 * ratio;
            let i = (position.floor() as usize).min(last);
            let frac = position - i as f64;
            let a = samples[i] as f64;
            let b = samples[(i + 1).min(last)] as f64;
            to_sample(a + (b - a) * frac)
        })
        .collect()
}

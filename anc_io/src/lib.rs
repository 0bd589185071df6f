//! Audio file handling for the noise cancellation engines.
//!
//! Reads and writes integer PCM WAV files using [hound](https://crates.io/crates/hound),
//! and converts arbitrary PCM to the mono, 16 bit, 44.1 kHz signals the
//! engines operate on.

mod error;
mod normalize;
mod wav;
mod waveform;

pub use error::{WavError, WavResult};
pub use normalize::{normalize, read_signal, resample_linear, TARGET_SAMPLE_RATE};
pub use wav::{read_wav, write_wav, WavAudio};
pub use waveform::{write_waveform, write_waveform_to};

//! `[Sample]` extensions.

use micromath::F32Ext;

use crate::common::Sample;

const FULL_SCALE: f32 = 32768.0;

/// Level measurements on 16 bit signals, relative to full scale.
pub trait SignalExt {
    /// Returns the maximum absolute value, where 1 is full scale.
    fn peak_level(&self) -> f32;
    /// Returns the maximum absolute value in dB relative to full scale.
    fn peak_level_db(&self) -> f32;
    /// Returns the [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
    /// level, where 1 is full scale.
    fn rms_level(&self) -> f32;
    /// Returns the RMS level in dB relative to full scale.
    fn rms_level_db(&self) -> f32;
}

impl SignalExt for [Sample] {
    fn peak_level(&self) -> f32 {
        let mut max: f32 = 0.0;
        for sample in self.iter() {
            let value = (*sample as f32).abs() / FULL_SCALE;
            if value > max {
                max = value
            }
        }
        max
    }

    fn peak_level_db(&self) -> f32 {
        20. * F32Ext::log10(self.peak_level())
    }

    fn rms_level(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        };
        // Accumulate in f64, a long signal would lose precision in f32.
        let mut sum: f64 = 0.;
        for sample in self.iter() {
            let value = *sample as f64 / FULL_SCALE as f64;
            sum += value * value
        }
        F32Ext::sqrt((sum / (self.len() as f64)) as f32)
    }

    fn rms_level_db(&self) -> f32 {
        20. * F32Ext::log10(self.rms_level())
    }
}

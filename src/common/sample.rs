/// A signed 16 bit PCM amplitude.
pub type Sample = i16;

/// Converts a sample to the working value used by the engines.
#[inline]
pub fn to_working(sample: Sample) -> f64 {
    sample as f64
}

/// Rounds a working value to the nearest sample, saturating at the `i16` range.
///
/// Halfway cases round away from zero. NaN maps to 0; the engines report
/// non-finite values before they reach this point.
#[inline]
pub fn to_sample(value: f64) -> Sample {
    let rounded = value.round();
    if rounded >= Sample::MAX as f64 {
        Sample::MAX
    } else if rounded <= Sample::MIN as f64 {
        Sample::MIN
    } else if rounded.is_nan() {
        0
    } else {
        rounded as Sample
    }
}

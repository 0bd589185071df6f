//! Error types for the adaptive filtering engines.

use thiserror::Error;

use crate::engine::EngineKind;

/// Errors reported by the engines and the streaming driver.
///
/// None of these are retried internally. Adaptive filtering is stateful, so
/// the only recovery is to restart the whole run with different options.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AncError {
    /// Desired and reference signals have different lengths.
    #[error("signal length mismatch: desired has {desired} samples, reference has {reference}")]
    LengthMismatch { desired: usize, reference: usize },

    /// A reference based engine was run without a reference signal.
    #[error("{engine} engine requires a reference signal")]
    MissingReference { engine: EngineKind },

    /// The engine produced a non-finite value or a vanishing gain denominator.
    ///
    /// `sample_index` is the stream position of the failing sample, that is the
    /// number of samples the engine had processed since construction or its
    /// last reset. It equals the index into the signal for a run on a fresh
    /// engine.
    #[error("numerical instability in {engine} engine at sample {sample_index}: {reason}")]
    NumericalInstability {
        engine: EngineKind,
        sample_index: u64,
        reason: String,
    },

    /// Buffers or matrices could not be allocated.
    #[error("failed to allocate {what} of {len} elements")]
    AllocationFailure { what: &'static str, len: usize },

    /// Invalid engine options.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The run was cancelled through the driver's cancellation flag.
    /// `sample_index` is the stream position of the first unprocessed sample,
    /// counted like in [`AncError::NumericalInstability`].
    #[error("run cancelled before sample {sample_index}")]
    Cancelled { sample_index: u64 },
}

/// Result type for engine operations.
pub type Result<T> = core::result::Result<T, AncError>;

/// Allocates a zero filled slice, reporting exhaustion instead of aborting.
pub(crate) fn try_zeroed(what: &'static str, len: usize) -> Result<Box<[f64]>> {
    let mut values: Vec<f64> = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| AncError::AllocationFailure { what, len })?;
    values.resize(len, 0.0);
    Ok(values.into_boxed_slice())
}

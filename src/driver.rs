//! Per sample orchestration of an engine over whole signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::common::{to_sample, to_working, Sample, SignalExt};
use crate::engine::Engine;
use crate::error::{AncError, Result};

/// Feeds aligned desired/reference samples to an engine and collects the
/// rounded, clamped output.
///
/// Engine state is not reset between calls, so a long signal can be processed
/// as a sequence of chunks.
#[derive(Debug, Default, Clone)]
pub struct StreamingDriver {
    cancel: Option<Arc<AtomicBool>>,
}

impl StreamingDriver {
    pub fn new() -> Self {
        StreamingDriver { cancel: None }
    }

    /// Uses `flag` to cancel runs. The flag is polled before every sample.
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        StreamingDriver { cancel: Some(flag) }
    }

    /// Runs a reference based engine. `desired` and `reference` must have the
    /// same length. Engines that don't use a reference ignore it, but the
    /// lengths must still match.
    pub fn run<E: Engine + ?Sized>(
        &self,
        desired: &[Sample],
        reference: &[Sample],
        engine: &mut E,
    ) -> Result<Vec<Sample>> {
        if desired.len() != reference.len() {
            return Err(AncError::LengthMismatch {
                desired: desired.len(),
                reference: reference.len(),
            });
        }
        self.process(desired, Some(reference), engine)
    }

    /// Runs an engine that needs no reference signal, such as the predictor.
    pub fn run_single<E: Engine + ?Sized>(
        &self,
        input: &[Sample],
        engine: &mut E,
    ) -> Result<Vec<Sample>> {
        if engine.requires_reference() {
            return Err(AncError::MissingReference {
                engine: engine.kind(),
            });
        }
        self.process(input, None, engine)
    }

    fn process<E: Engine + ?Sized>(
        &self,
        desired: &[Sample],
        reference: Option<&[Sample]>,
        engine: &mut E,
    ) -> Result<Vec<Sample>> {
        let mut output: Vec<Sample> = Vec::new();
        output
            .try_reserve_exact(desired.len())
            .map_err(|_| AncError::AllocationFailure {
                what: "output signal",
                len: desired.len(),
            })?;

        for (t, d) in desired.iter().enumerate() {
            if self.is_cancelled() {
                let sample_index = engine.processed();
                log::warn!("{} run cancelled at sample {}", engine.kind(), sample_index);
                return Err(AncError::Cancelled { sample_index });
            }
            let x = reference.map_or(0.0, |reference| to_working(reference[t]));
            let e = engine.step(to_working(*d), x)?;
            output.push(to_sample(e));
        }

        log::debug!(
            "{} run: {} samples, input {:.1} dBFS RMS, output {:.1} dBFS RMS",
            engine.kind(),
            output.len(),
            desired.rms_level_db(),
            output.rms_level_db()
        );
        Ok(output)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Runs `engine` over aligned desired and reference signals.
///
/// Fails with [`AncError::LengthMismatch`] before processing anything if the
/// lengths differ.
pub fn run<E: Engine + ?Sized>(
    desired: &[Sample],
    reference: &[Sample],
    engine: &mut E,
) -> Result<Vec<Sample>> {
    StreamingDriver::new().run(desired, reference, engine)
}

/// Runs an engine that needs no reference signal over `input`.
pub fn run_single<E: Engine + ?Sized>(input: &[Sample], engine: &mut E) -> Result<Vec<Sample>> {
    StreamingDriver::new().run_single(input, engine)
}

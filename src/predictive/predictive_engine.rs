use crate::common::SampleBuffer;
use crate::config::PredictorOptions;
use crate::engine::{Engine, EngineKind};
use crate::error::{AncError, Result};

/// Fixed coefficient autoregressive noise predictor.
///
/// The noise in the current sample is estimated as a weighted sum of the
/// previous input samples and subtracted. No reference signal is used.
pub struct PredictiveEngine {
    coefficients: Box<[f64]>,
    /// Previous input samples, most recent at index 0.
    history: SampleBuffer,
    processed: u64,
}

impl PredictiveEngine {
    /// Creates a predictor with the default coefficients.
    pub fn new() -> Result<Self> {
        PredictiveEngine::from_options(PredictorOptions::default())
    }

    pub fn from_options(options: PredictorOptions) -> Result<Self> {
        options.validate()?;
        let history = SampleBuffer::try_new(options.coefficients.len())?;
        Ok(PredictiveEngine {
            coefficients: options.coefficients.into_boxed_slice(),
            history,
            processed: 0,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// The noise estimate for the next input sample.
    pub fn prediction(&self) -> f64 {
        let mut predicted = 0.0;
        for (i, c) in self.coefficients.iter().enumerate() {
            predicted += c * self.history.at(i);
        }
        predicted
    }

    /// Removes the predicted noise from `input` and records `input` in the history.
    pub fn step_input(&mut self, input: f64) -> Result<f64> {
        let output = input - self.prediction();
        if !output.is_finite() {
            return Err(AncError::NumericalInstability {
                engine: EngineKind::Predictive,
                sample_index: self.processed,
                reason: format!("output is {}", output),
            });
        }
        self.history.push(input);
        self.processed += 1;
        Ok(output)
    }
}

impl Engine for PredictiveEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Predictive
    }

    fn requires_reference(&self) -> bool {
        false
    }

    /// `reference` is ignored.
    fn step(&mut self, desired: f64, _reference: f64) -> Result<f64> {
        self.step_input(desired)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.processed = 0;
    }

    fn processed(&self) -> u64 {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::PredictiveEngine;
    use crate::config::PredictorOptions;
    use crate::engine::Engine;
    use approx::assert_relative_eq;

    #[test]
    fn default_coefficient_trace() {
        let mut predictor = PredictiveEngine::new().unwrap();
        assert_eq!(predictor.coefficients(), &[0.5, -0.3, 0.2]);

        // Empty history predicts nothing.
        assert_relative_eq!(predictor.step_input(100.0).unwrap(), 100.0);
        // 0.5 * 100
        assert_relative_eq!(predictor.step_input(100.0).unwrap(), 50.0, epsilon = 1e-12);
        // 0.5 * 100 - 0.3 * 100
        assert_relative_eq!(predictor.step_input(-40.0).unwrap(), -60.0, epsilon = 1e-12);
        // 0.5 * -40 - 0.3 * 100 + 0.2 * 100
        assert_relative_eq!(predictor.step_input(0.0).unwrap(), 30.0, epsilon = 1e-12);
        assert_eq!(predictor.processed(), 4);
    }

    #[test]
    fn reference_is_ignored() {
        let mut a = PredictiveEngine::new().unwrap();
        let mut b = PredictiveEngine::new().unwrap();
        assert!(!a.requires_reference());
        for (n, d) in [3.0, -7.0, 12.0, 5.0, 0.0].iter().enumerate() {
            let with_reference = a.step(*d, 1000.0 * n as f64).unwrap();
            let without = b.step_input(*d).unwrap();
            assert_eq!(with_reference, without);
        }
    }

    #[test]
    fn constant_input_with_unit_predictor_is_cancelled() {
        let mut predictor = PredictiveEngine::from_options(PredictorOptions {
            coefficients: vec![1.0],
        })
        .unwrap();
        assert_eq!(predictor.step_input(250.0).unwrap(), 250.0);
        for _ in 0..10 {
            assert_eq!(predictor.step_input(250.0).unwrap(), 0.0);
        }
        predictor.reset();
        assert_eq!(predictor.prediction(), 0.0);
        assert_eq!(predictor.step_input(250.0).unwrap(), 250.0);
    }
}

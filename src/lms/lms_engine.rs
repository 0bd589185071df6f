use crate::common::SampleBuffer;
use crate::config::{LmsOptions, StepNormalization};
use crate::engine::{Engine, EngineKind};
use crate::error::{try_zeroed, AncError, Result};

/// An adaptive [least mean squares filter](https://en.wikipedia.org/wiki/Least_mean_squares_filter),
/// optionally with the normalized (NLMS) update. Using the same notation as in
/// the linked description.
pub struct LmsEngine {
    /// FIR filter coefficients
    w: Box<[f64]>,
    /// Most recent reference values. Newest sample is at index 0.
    x: SampleBuffer,
    /// Step size
    μ: f64,
    normalization: StepNormalization,
    processed: u64,
}

impl LmsEngine {
    /// Creates a plain (not normalized) single weight filter with the given
    /// step size.
    pub fn new(mu: f64) -> Result<Self> {
        LmsEngine::from_options(LmsOptions {
            order: 1,
            mu,
            normalization: StepNormalization::None,
        })
    }

    pub fn from_options(options: LmsOptions) -> Result<Self> {
        options.validate()?;
        Ok(LmsEngine {
            w: try_zeroed("LMS weights", options.order)?,
            x: SampleBuffer::try_new(options.order)?,
            μ: options.mu,
            normalization: options.normalization,
            processed: 0,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.w
    }

    pub fn order(&self) -> usize {
        self.w.len()
    }

    pub fn mu(&self) -> f64 {
        self.μ
    }

    pub fn normalization(&self) -> StepNormalization {
        self.normalization
    }

    fn instability(&self, reason: String) -> AncError {
        AncError::NumericalInstability {
            engine: EngineKind::Lms,
            sample_index: self.processed,
            reason,
        }
    }
}

impl Engine for LmsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Lms
    }

    fn step(&mut self, desired: f64, reference: f64) -> Result<f64> {
        self.x.push(reference);

        // Compute filter output y = w applied to x.
        let mut y = 0.0;
        for (i, w) in self.w.iter().enumerate() {
            y += w * self.x.at(i);
        }

        let e = desired - y;
        if !e.is_finite() {
            return Err(self.instability(format!("error signal is {}", e)));
        }

        let delta_scale = match self.normalization {
            StepNormalization::None => self.μ * e,
            // Scale the step by the reference power in the window.
            StepNormalization::Power { eps } => self.μ * e / (self.x.power() + eps),
        };
        for (i, w) in self.w.iter_mut().enumerate() {
            *w += delta_scale * self.x.at(i);
        }
        if let Some(i) = self.w.iter().position(|w| !w.is_finite()) {
            return Err(self.instability(format!("weight {} is {}", i, self.w[i])));
        }

        self.processed += 1;
        Ok(e)
    }

    fn reset(&mut self) {
        for w in self.w.iter_mut() {
            *w = 0.0;
        }
        self.x.clear();
        self.processed = 0;
    }

    fn processed(&self) -> u64 {
        self.processed
    }
}

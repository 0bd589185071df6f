//! Engine options.
//!
//! Every engine is built from an options struct with documented valid ranges.
//! [`EngineConfig`] selects one of them at runtime and can be deserialized,
//! e.g from JSON:
//!
//! ```
//! use micro_anc::config::EngineConfig;
//! use micro_anc::{Engine, EngineKind};
//!
//! let json = r#"{ "engine": "rls", "order": 16, "lambda": 0.995 }"#;
//! let config: EngineConfig = serde_json::from_str(json).unwrap();
//! let engine = config.build().unwrap();
//! assert_eq!(engine.kind(), EngineKind::Rls);
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::{Engine, EngineKind};
use crate::error::{AncError, Result};
use crate::lms::LmsEngine;
use crate::predictive::PredictiveEngine;
use crate::rls::RlsEngine;

/// How the LMS step is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepNormalization {
    /// Plain LMS, `w += μ·e·x`.
    None,
    /// NLMS, `w += μ·e·x / (‖x‖² + eps)`.
    Power { eps: f64 },
}

/// Regularization of the normalized step used by [`LmsOptions::default`].
/// Small next to the power of any audible 16 bit reference.
pub const DEFAULT_EPS: f64 = 1.0;

impl Default for StepNormalization {
    fn default() -> Self {
        StepNormalization::Power { eps: DEFAULT_EPS }
    }
}

/// LMS options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmsOptions {
    /// Number of taps (default: 1). 1 is the classic single weight filter.
    pub order: usize,
    /// Step size (default: 0.1). Must be finite and positive. With the
    /// normalized step any `0 < μ < 2` is stable regardless of signal level.
    /// Plain LMS is stable for `μ·‖x‖² < 2`, so with raw 16 bit amplitudes it
    /// needs tiny values, typically 1e-10 to 1e-8.
    pub mu: f64,
    /// Step normalization (default: power with `eps` = [`DEFAULT_EPS`]).
    pub normalization: StepNormalization,
}

impl Default for LmsOptions {
    fn default() -> Self {
        Self {
            order: 1,
            mu: 0.1,
            normalization: StepNormalization::default(),
        }
    }
}

impl LmsOptions {
    pub fn validate(&self) -> Result<()> {
        validate_order(self.order)?;
        if !(self.mu.is_finite() && self.mu > 0.0) {
            return Err(AncError::InvalidParameter(format!(
                "mu must be finite and > 0, got {}",
                self.mu
            )));
        }
        if let StepNormalization::Power { eps } = self.normalization {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(AncError::InvalidParameter(format!(
                    "eps must be finite and > 0, got {}",
                    eps
                )));
            }
        }
        Ok(())
    }
}

/// Denominator used when computing the RLS gain vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainDenominator {
    /// `λ + xᵀ·P·x`, the full quadratic form.
    Quadratic,
    /// `λ + Σ x[k]²·P[k][k]`. Ignores the off-diagonal terms of P. Only
    /// useful for reproducing output of the legacy C implementation; it
    /// changes convergence speed and output values.
    LegacyDiagonal,
}

impl Default for GainDenominator {
    fn default() -> Self {
        GainDenominator::Quadratic
    }
}

/// RLS options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlsOptions {
    /// Number of taps (default: 32). Cost per sample is O(order²).
    pub order: usize,
    /// Forgetting factor, 0 < λ ≤ 1 (default: 0.99). Smaller values track
    /// non-stationary noise faster.
    pub lambda: f64,
    /// P is initialized to I/δ, δ > 0 (default: 0.01). Larger values mean
    /// less initial trust in the identity prior.
    pub delta: f64,
    /// Gain denominator (default: quadratic).
    pub gain_denominator: GainDenominator,
}

impl Default for RlsOptions {
    fn default() -> Self {
        Self {
            order: 32,
            lambda: 0.99,
            delta: 0.01,
            gain_denominator: GainDenominator::Quadratic,
        }
    }
}

impl RlsOptions {
    pub fn validate(&self) -> Result<()> {
        validate_order(self.order)?;
        if !(self.lambda.is_finite() && self.lambda > 0.0 && self.lambda <= 1.0) {
            return Err(AncError::InvalidParameter(format!(
                "lambda must be in (0, 1], got {}",
                self.lambda
            )));
        }
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(AncError::InvalidParameter(format!(
                "delta must be finite and > 0, got {}",
                self.delta
            )));
        }
        Ok(())
    }
}

/// Autoregressive predictor options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorOptions {
    /// Fixed prediction coefficients, most recent sample first
    /// (default: `[0.5, -0.3, 0.2]`). The prediction order is the length.
    pub coefficients: Vec<f64>,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            coefficients: vec![0.5, -0.3, 0.2],
        }
    }
}

impl PredictorOptions {
    pub fn validate(&self) -> Result<()> {
        validate_order(self.coefficients.len())?;
        if let Some(c) = self.coefficients.iter().find(|c| !c.is_finite()) {
            return Err(AncError::InvalidParameter(format!(
                "prediction coefficients must be finite, got {}",
                c
            )));
        }
        Ok(())
    }
}

fn validate_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(AncError::InvalidParameter(
            "order must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// Runtime engine selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "lowercase")]
pub enum EngineConfig {
    Lms(LmsOptions),
    Rls(RlsOptions),
    Predictive(PredictorOptions),
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::Lms(LmsOptions::default())
    }
}

impl EngineConfig {
    pub fn kind(&self) -> EngineKind {
        match self {
            EngineConfig::Lms(_) => EngineKind::Lms,
            EngineConfig::Rls(_) => EngineKind::Rls,
            EngineConfig::Predictive(_) => EngineKind::Predictive,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            EngineConfig::Lms(options) => options.validate(),
            EngineConfig::Rls(options) => options.validate(),
            EngineConfig::Predictive(options) => options.validate(),
        }
    }

    /// Builds a fresh engine instance.
    pub fn build(&self) -> Result<Box<dyn Engine>> {
        log::debug!("Building {} engine: {:?}", self.kind(), self);
        let engine: Box<dyn Engine> = match self {
            EngineConfig::Lms(options) => Box::new(LmsEngine::from_options(options.clone())?),
            EngineConfig::Rls(options) => Box::new(RlsEngine::from_options(options.clone())?),
            EngineConfig::Predictive(options) => {
                Box::new(PredictiveEngine::from_options(options.clone())?)
            }
        };
        Ok(engine)
    }
}

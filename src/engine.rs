use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifies an engine implementation in errors and log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Lms,
    Rls,
    Predictive,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Lms => write!(f, "LMS"),
            EngineKind::Rls => write!(f, "RLS"),
            EngineKind::Predictive => write!(f, "predictive"),
        }
    }
}

/// An adaptive noise cancellation engine, advanced one sample at a time.
///
/// `step` may only depend on samples passed in previous calls and the current
/// one. The returned value is the unrounded error signal, i.e the cleaned
/// sample; rounding to the output sample format is left to the caller.
pub trait Engine: Send {
    fn kind(&self) -> EngineKind;

    /// Whether `step` uses its `reference` argument.
    fn requires_reference(&self) -> bool {
        true
    }

    /// Processes one desired/reference sample pair.
    fn step(&mut self, desired: f64, reference: f64) -> Result<f64>;

    /// Restores the state the engine had right after construction.
    fn reset(&mut self);

    /// Number of samples processed since construction or the last reset.
    fn processed(&self) -> u64;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn kind(&self) -> EngineKind {
        (**self).kind()
    }

    fn requires_reference(&self) -> bool {
        (**self).requires_reference()
    }

    fn step(&mut self, desired: f64, reference: f64) -> Result<f64> {
        (**self).step(desired, reference)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn processed(&self) -> u64 {
        (**self).processed()
    }
}

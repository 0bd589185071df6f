//! Adaptive noise cancellation for 16 bit PCM audio.
//!
//! A desired signal d(n) containing noise is cleaned by subtracting an estimate
//! of that noise, y(n). The estimate is either derived from a correlated
//! reference signal x(n) by an adaptive FIR filter, or predicted from the
//! previous samples of d(n) itself. The cleaned signal is the error
//! e(n) = d(n) - y(n).
//!
//! Engines
//! * [`lms::LmsEngine`], least mean squares with optional step normalization.
//! * [`rls::RlsEngine`], recursive least squares with exponential forgetting.
//! * [`predictive::PredictiveEngine`], fixed coefficient linear prediction
//! without a reference signal.
//!
//! All engines implement [`Engine`] and process one sample at a time with no
//! allocations after construction. [`StreamingDriver`] runs an engine over
//! whole signals and converts to and from 16 bit samples, and
//! [`batch::run_batch`] processes independent signals in parallel.
//!
//! # Examples
//!
//! ```
//! use micro_anc::lms::LmsEngine;
//! use micro_anc::run;
//!
//! let desired = [10, 20, 30, 40];
//! let reference = [1, 2, 3, 4];
//! let mut engine = LmsEngine::new(0.01).unwrap();
//! let cleaned = run(&desired, &reference, &mut engine).unwrap();
//! assert_eq!(cleaned, vec![10, 20, 29, 35]);
//! ```
//!
//! Engines can also be selected at runtime
//!
//! ```
//! use micro_anc::config::{EngineConfig, RlsOptions};
//! use micro_anc::run;
//!
//! let config = EngineConfig::Rls(RlsOptions { order: 8, ..RlsOptions::default() });
//! let mut engine = config.build().unwrap();
//! let reference: Vec<i16> = (0..1000).map(|n| ((n * 7919) % 2001 - 1000) as i16).collect();
//! let desired: Vec<i16> = reference.iter().map(|x| x / 2).collect();
//! let cleaned = run(&desired, &reference, &mut engine).unwrap();
//! assert_eq!(cleaned.len(), desired.len());
//! ```

pub mod batch;
pub mod common;
pub mod config;
mod driver;
mod engine;
mod error;
pub mod lms;
pub mod predictive;
pub mod rls;

pub use common::{Sample, SignalExt};
pub use driver::{run, run_single, StreamingDriver};
pub use engine::{Engine, EngineKind};
pub use error::{AncError, Result};

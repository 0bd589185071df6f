//! Fixed coefficient [autoregressive](https://en.wikipedia.org/wiki/Autoregressive_model)
//! noise prediction, for when no separate reference signal is available.

mod predictive_engine;

pub use predictive_engine::PredictiveEngine;

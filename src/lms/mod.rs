//! [Least mean squares](https://en.wikipedia.org/wiki/Least_mean_squares_filter)
//! adaptive filter, with optional [normalized](https://en.wikipedia.org/wiki/Least_mean_squares_filter#Normalized_least_mean_squares_filter_(NLMS))
//! step.
//!
//! # Examples
//! ## Noise cancellation
//!
//! This example uses a scaled copy of the reference x(n) as the desired
//! signal d(n) (notation from [here](https://en.wikipedia.org/wiki/Least_mean_squares_filter)).
//! The expected result is convergence to a single tap filter equal to the
//! scale factor, cancelling d(n) completely.
//!
//! ```
//! use rand::{rngs::StdRng, Rng, SeedableRng};
//! use micro_anc::config::{LmsOptions, StepNormalization};
//! use micro_anc::lms::LmsEngine;
//! use micro_anc::Engine;
//!
//! // Generate noise signal
//! let sample_count = 10000;
//! let mut rng = StdRng::seed_from_u64(123);
//! let signal: Vec<f64> = (0..sample_count)
//!     .map(|_| rng.random_range(-1000.0..=1000.0))
//!     .collect();
//!
//! // Create filter instance
//! let mut filter = LmsEngine::from_options(LmsOptions {
//!     order: 10,
//!     mu: 0.5,
//!     normalization: StepNormalization::Power { eps: 1e-3 },
//! })
//! .unwrap();
//!
//! // Perform filtering
//! for (i, x) in signal.iter().enumerate() {
//!     let d = 0.3 * *x;
//!     let e = filter.step(d, *x).unwrap();
//!
//!     // Give the filter time to converge
//!     if i > 500 {
//!         // The noise should be almost completely cancelled out
//!         assert!(e.abs() < 0.01);
//!     }
//! }
//! assert!((filter.weights()[0] - 0.3).abs() < 1e-4);
//! ```

mod lms_engine;

pub use lms_engine::LmsEngine;

//! [Recursive least squares](https://en.wikipedia.org/wiki/Recursive_least_squares_filter)
//! adaptive filter.
//!
//! # Examples
//! ## Noise path identification
//!
//! The desired signal is the reference passed through an unknown FIR noise
//! path. RLS recovers the path within a few hundred samples and cancels the
//! noise almost completely.
//!
//! ```
//! use micro_anc::rls::RlsEngine;
//! use micro_anc::Engine;
//!
//! let h = [0.6, -0.25];
//! let mut rls = RlsEngine::new(2).unwrap();
//! let mut previous = 0.0;
//! for n in 0..2000u64 {
//!     // Deterministic pseudo random reference
//!     let x = ((n * n * 7919 + 13 * n) % 2003) as f64 - 1001.0;
//!     let d = h[0] * x + h[1] * previous;
//!     previous = x;
//!     let e = rls.step(d, x).unwrap();
//!     if n > 200 {
//!         assert!(e.abs() < 1e-3);
//!     }
//! }
//! assert!((rls.weights()[0] - 0.6).abs() < 1e-6);
//! assert!((rls.weights()[1] + 0.25).abs() < 1e-6);
//! ```

mod rls_engine;

pub use rls_engine::RlsEngine;

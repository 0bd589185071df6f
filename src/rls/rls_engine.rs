use crate::common::{SampleBuffer, SquareMatrix};
use crate::config::{GainDenominator, RlsOptions};
use crate::engine::{Engine, EngineKind};
use crate::error::{try_zeroed, AncError, Result};

/// An adaptive [recursive least squares](https://en.wikipedia.org/wiki/Recursive_least_squares_filter)
/// filter with exponential forgetting.
///
/// All state is kept in `f64` regardless of the sample format. Per sample cost
/// is O(order²).
pub struct RlsEngine {
    /// FIR filter coefficients
    w: Box<[f64]>,
    /// Most recent reference values. Newest sample is at index 0.
    x: SampleBuffer,
    /// Inverse correlation matrix estimate
    p: SquareMatrix,
    /// Scratch space for P·x
    px: Box<[f64]>,
    /// Scratch space for the gain vector
    k: Box<[f64]>,
    λ: f64,
    δ: f64,
    gain_denominator: GainDenominator,
    processed: u64,
}

impl RlsEngine {
    pub fn new(order: usize) -> Result<Self> {
        RlsEngine::from_options(RlsOptions {
            order,
            ..RlsOptions::default()
        })
    }

    pub fn from_options(options: RlsOptions) -> Result<Self> {
        options.validate()?;
        let order = options.order;
        Ok(RlsEngine {
            w: try_zeroed("RLS weights", order)?,
            x: SampleBuffer::try_new(order)?,
            p: SquareMatrix::scaled_identity(order, 1.0 / options.delta)?,
            px: try_zeroed("RLS scratch", order)?,
            k: try_zeroed("RLS gain", order)?,
            λ: options.lambda,
            δ: options.delta,
            gain_denominator: options.gain_denominator,
            processed: 0,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.w
    }

    /// The current inverse correlation matrix estimate P.
    pub fn p_matrix(&self) -> &SquareMatrix {
        &self.p
    }

    /// The gain vector computed by the most recent step.
    pub fn gain(&self) -> &[f64] {
        &self.k
    }

    pub fn order(&self) -> usize {
        self.w.len()
    }

    pub fn lambda(&self) -> f64 {
        self.λ
    }

    pub fn delta(&self) -> f64 {
        self.δ
    }

    pub fn gain_denominator(&self) -> GainDenominator {
        self.gain_denominator
    }

    fn instability(&self, reason: String) -> AncError {
        AncError::NumericalInstability {
            engine: EngineKind::Rls,
            sample_index: self.processed,
            reason,
        }
    }
}

impl Engine for RlsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Rls
    }

    /// Performs one RLS update. After an error the engine state is undefined
    /// and the engine must be reset before further use.
    fn step(&mut self, desired: f64, reference: f64) -> Result<f64> {
        self.x.push(reference);
        let order = self.order();

        let mut y = 0.0;
        for (i, w) in self.w.iter().enumerate() {
            y += w * self.x.at(i);
        }
        let e = desired - y;
        if !e.is_finite() {
            return Err(self.instability(format!("error signal is {}", e)));
        }

        // Without excitation the gain is zero and the update would only
        // scale P by 1/λ.
        if self.x.iter().all(|x| x == 0.0) {
            for k in self.k.iter_mut() {
                *k = 0.0;
            }
            self.processed += 1;
            return Ok(e);
        }

        // px = P·x
        let x = &self.x;
        self.p.mul_vec(|j| x.at(j), &mut self.px);

        let den = match self.gain_denominator {
            GainDenominator::Quadratic => {
                let mut xpx = 0.0;
                for (j, px) in self.px.iter().enumerate() {
                    xpx += self.x.at(j) * px;
                }
                self.λ + xpx
            }
            GainDenominator::LegacyDiagonal => {
                let mut sum = 0.0;
                for (j, p_jj) in self.p.diagonal().enumerate() {
                    let x_j = self.x.at(j);
                    sum += x_j * p_jj * x_j;
                }
                self.λ + sum
            }
        };
        if !den.is_finite() || den.abs() < f64::EPSILON {
            return Err(self.instability(format!("gain denominator is {}", den)));
        }

        // K = P·x / den, w += K·e
        for i in 0..order {
            self.k[i] = self.px[i] / den;
            self.w[i] += self.k[i] * e;
        }

        // P = (P - K·(Pᵀx)ᵀ) / λ. P is kept symmetric, so Pᵀx = px.
        let inv_λ = 1.0 / self.λ;
        for i in 0..order {
            for j in 0..order {
                let value = inv_λ * (self.p.get(i, j) - self.k[i] * self.px[j]);
                self.p.set(i, j, value);
            }
        }
        // Counter the asymmetry introduced by round off.
        self.p.symmetrize();

        // P grows by 1/λ per sample in directions the reference doesn't
        // excite. Keep its diagonal at or below the initial 1/δ so it can't
        // wind up and overflow. px is free to use as scratch here.
        self.p.limit_diagonal(1.0 / self.δ, &mut self.px);

        if let Some(i) = self.w.iter().position(|w| !w.is_finite()) {
            return Err(self.instability(format!("weight {} is {}", i, self.w[i])));
        }
        if !self.p.is_finite() {
            return Err(self.instability("correlation matrix has non-finite entries".into()));
        }

        self.processed += 1;
        Ok(e)
    }

    fn reset(&mut self) {
        for i in 0..self.order() {
            self.w[i] = 0.0;
            self.k[i] = 0.0;
            self.px[i] = 0.0;
        }
        self.x.clear();
        self.p.set_scaled_identity(1.0 / self.δ);
        self.processed = 0;
    }

    fn processed(&self) -> u64 {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::RlsEngine;
    use crate::config::{GainDenominator, RlsOptions};
    use crate::engine::Engine;
    use crate::AncError;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn noise(count: usize, amplitude: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| rng.random_range(-amplitude..=amplitude))
            .collect()
    }

    /// Convolves `x` with `h`, treating samples before the start as zero.
    fn fir(h: &[f64], x: &[f64]) -> Vec<f64> {
        (0..x.len())
            .map(|n| {
                h.iter()
                    .enumerate()
                    .filter(|(i, _)| *i <= n)
                    .map(|(i, h)| h * x[n - i])
                    .sum()
            })
            .collect()
    }

    #[test]
    fn initial_state() {
        let rls = RlsEngine::from_options(RlsOptions {
            order: 4,
            delta: 0.01,
            ..RlsOptions::default()
        })
        .unwrap();
        assert_eq!(rls.weights(), &[0.0; 4]);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 100.0 } else { 0.0 };
                assert_relative_eq!(rls.p_matrix().get(i, j), expected);
            }
        }
    }

    #[test]
    fn zero_reference_passes_desired_through() {
        let mut rls = RlsEngine::new(8).unwrap();
        for n in 0..500 {
            let d = ((n * 37) % 2001) as f64 - 1000.0;
            assert_eq!(rls.step(d, 0.0).unwrap(), d);
        }
        assert!(rls.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn p_stays_symmetric() {
        let mut rls = RlsEngine::new(6).unwrap();
        let x = noise(2000, 3000.0, 7);
        let d = noise(2000, 3000.0, 8);
        for (x, d) in x.iter().zip(d.iter()) {
            rls.step(*d, *x).unwrap();
            assert_eq!(rls.p_matrix().asymmetry(), 0.0);
        }
    }

    #[test]
    fn identifies_fir_noise_path() {
        let h = [0.5, 0.3, 0.1];
        let x = noise(1000, 1000.0, 123);
        let d = fir(&h, &x);
        let mut rls = RlsEngine::from_options(RlsOptions {
            order: 3,
            ..RlsOptions::default()
        })
        .unwrap();
        let mut late_error: f64 = 0.0;
        for (n, (x, d)) in x.iter().zip(d.iter()).enumerate() {
            let e = rls.step(*d, *x).unwrap();
            if n > 100 {
                late_error = late_error.max(e.abs());
            }
        }
        for (w, h) in rls.weights().iter().zip(h.iter()) {
            assert_relative_eq!(*w, *h, epsilon = 1e-6);
        }
        assert!(late_error < 1e-3, "late error {}", late_error);
    }

    #[test]
    fn converges_faster_than_lms() {
        use crate::lms::LmsEngine;

        let k = -0.4;
        let x = noise(200, 1000.0, 99);
        let mut rls = RlsEngine::new(1).unwrap();
        let mut lms = LmsEngine::new(1e-8).unwrap();
        for x in x.iter() {
            rls.step(k * x, *x).unwrap();
            lms.step(k * x, *x).unwrap();
        }
        let rls_miss = (rls.weights()[0] - k).abs();
        let lms_miss = (lms.weights()[0] - k).abs();
        assert!(rls_miss < lms_miss);
        assert!(rls_miss < 1e-6);
    }

    #[test]
    fn legacy_denominator_changes_output() {
        let x = noise(300, 1000.0, 5);
        let d = fir(&[0.8, -0.2], &x);
        let mut quadratic = RlsEngine::new(4).unwrap();
        let mut legacy = RlsEngine::from_options(RlsOptions {
            order: 4,
            gain_denominator: GainDenominator::LegacyDiagonal,
            ..RlsOptions::default()
        })
        .unwrap();

        // The first step only has a single non-zero tap, so both agree.
        let first_q = quadratic.step(d[0], x[0]).unwrap();
        let first_l = legacy.step(d[0], x[0]).unwrap();
        assert_eq!(first_q, first_l);
        assert_relative_eq!(quadratic.weights()[0], legacy.weights()[0], epsilon = 1e-12);

        let mut differs = false;
        for (x, d) in x.iter().zip(d.iter()).skip(1) {
            let e_q = quadratic.step(*d, *x).unwrap();
            let e_l = legacy.step(*d, *x).unwrap();
            differs |= (e_q - e_l).abs() > 1e-9;
        }
        assert!(differs);
        assert_eq!(legacy.gain_denominator(), GainDenominator::LegacyDiagonal);
    }

    #[test]
    fn reports_non_finite_error() {
        let mut rls = RlsEngine::new(2).unwrap();
        rls.step(1.0, 1.0).unwrap();
        match rls.step(f64::NAN, 1.0) {
            Err(AncError::NumericalInstability { sample_index, .. }) => assert_eq!(sample_index, 1),
            other => panic!("expected numerical instability, got {:?}", other),
        }
    }

    #[test]
    fn reports_overflowing_denominator() {
        let mut rls = RlsEngine::new(2).unwrap();
        match rls.step(0.0, 1e200) {
            Err(AncError::NumericalInstability { reason, .. }) => {
                assert!(reason.contains("denominator"), "{}", reason)
            }
            other => panic!("expected numerical instability, got {:?}", other),
        }
    }

    #[test]
    fn silent_reference_keeps_initial_state() {
        let mut rls = RlsEngine::from_options(RlsOptions::default()).unwrap();
        let initial = rls.p_matrix().clone();
        for n in 0..150_000u64 {
            let d = (n % 2001) as f64 - 1000.0;
            assert_eq!(rls.step(d, 0.0).unwrap(), d);
        }
        assert_eq!(rls.p_matrix(), &initial);
        assert!(rls.weights().iter().all(|w| *w == 0.0));
        assert_eq!(rls.processed(), 150_000);
    }

    #[test]
    fn adapts_after_long_silence() {
        let h = [0.5, 0.3, 0.1];
        let mut x = vec![0.0; 80_000];
        x.extend(noise(3000, 1000.0, 11));
        let d = fir(&h, &x);
        let mut rls = RlsEngine::from_options(RlsOptions::default()).unwrap();
        let mut late_error: f64 = 0.0;
        for (n, (x, d)) in x.iter().zip(d.iter()).enumerate() {
            let e = rls.step(*d, *x).unwrap();
            if n > 80_500 {
                late_error = late_error.max(e.abs());
            }
        }
        for (w, h) in rls.weights().iter().zip(h.iter()) {
            assert_relative_eq!(*w, *h, epsilon = 1e-6);
        }
        assert!(late_error < 1e-3, "late error {}", late_error);
    }

    #[test]
    fn constant_reference_keeps_p_bounded() {
        // Only one direction of the tap space is excited, the others would
        // grow by 1/λ per sample.
        let mut rls = RlsEngine::from_options(RlsOptions {
            order: 4,
            ..RlsOptions::default()
        })
        .unwrap();
        let limit = 1.0 / rls.delta();
        for _ in 0..100_000 {
            rls.step(500.0, 1000.0).unwrap();
            assert!(rls.p_matrix().max_diagonal() <= limit * (1.0 + 1e-12));
        }
        assert!(rls.p_matrix().is_finite());
        assert!(rls.weights().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn reset_restores_initial_state() {
        let x = noise(50, 100.0, 1);
        let mut rls = RlsEngine::new(3).unwrap();
        let first: Vec<f64> = x.iter().map(|x| rls.step(0.5 * x, *x).unwrap()).collect();
        rls.reset();
        assert_eq!(rls.processed(), 0);
        assert_relative_eq!(rls.p_matrix().get(0, 0), 100.0);
        let second: Vec<f64> = x.iter().map(|x| rls.step(0.5 * x, *x).unwrap()).collect();
        assert_eq!(first, second);
    }
}

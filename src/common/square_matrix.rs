use crate::error::{try_zeroed, AncError, Result};

/// A dense `order × order` matrix of `f64` values in row major order.
///
/// All element access goes through [`SquareMatrix::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    order: usize,
    values: Box<[f64]>,
}

impl SquareMatrix {
    /// Returns `scale · I`.
    pub fn scaled_identity(order: usize, scale: f64) -> Result<Self> {
        let len = order
            .checked_mul(order)
            .ok_or(AncError::AllocationFailure {
                what: "correlation matrix",
                len: usize::MAX,
            })?;
        let mut matrix = SquareMatrix {
            order,
            values: try_zeroed("correlation matrix", len)?,
        };
        matrix.set_scaled_identity(scale);
        Ok(matrix)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.order && j < self.order);
        i * self.order + j
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.index(i, j);
        self.values[idx] = value;
    }

    pub fn set_scaled_identity(&mut self, scale: f64) {
        for i in 0..self.order {
            for j in 0..self.order {
                self.set(i, j, if i == j { scale } else { 0.0 });
            }
        }
    }

    /// Computes `self · x` into `result`.
    pub fn mul_vec(&self, x: impl Fn(usize) -> f64, result: &mut [f64]) {
        assert_eq!(result.len(), self.order);
        for (i, r) in result.iter_mut().enumerate() {
            let mut sum = 0.0;
            for j in 0..self.order {
                sum += self.get(i, j) * x(j);
            }
            *r = sum;
        }
    }

    /// Replaces the matrix by `(M + Mᵀ) / 2`.
    pub fn symmetrize(&mut self) {
        for i in 0..self.order {
            for j in (i + 1)..self.order {
                let mean = 0.5 * (self.get(i, j) + self.get(j, i));
                self.set(i, j, mean);
                self.set(j, i, mean);
            }
        }
    }

    /// The largest `|M[i][j] - M[j][i]|`.
    pub fn asymmetry(&self) -> f64 {
        let mut max: f64 = 0.0;
        for i in 0..self.order {
            for j in (i + 1)..self.order {
                max = max.max((self.get(i, j) - self.get(j, i)).abs());
            }
        }
        max
    }

    /// Scales rows and columns so that no diagonal element exceeds `limit`,
    /// using `scratch` (length `order`) for the per row factors.
    ///
    /// Element `(i, j)` is multiplied by `s_i · s_j` with
    /// `s_i = sqrt(limit / M[i][i])` where the diagonal is too large and 1
    /// elsewhere. This is the congruence `D·M·D` with diagonal `D`, so
    /// symmetry and positive semi-definiteness are kept. Returns whether
    /// anything was scaled.
    pub fn limit_diagonal(&mut self, limit: f64, scratch: &mut [f64]) -> bool {
        assert_eq!(scratch.len(), self.order);
        let mut limited = false;
        for (i, s) in scratch.iter_mut().enumerate() {
            let m_ii = self.get(i, i);
            *s = if m_ii > limit {
                limited = true;
                (limit / m_ii).sqrt()
            } else {
                1.0
            };
        }
        if limited {
            for i in 0..self.order {
                for j in 0..self.order {
                    let value = self.get(i, j) * (scratch[i] * scratch[j]);
                    self.set(i, j, value);
                }
            }
        }
        limited
    }

    /// The largest diagonal element, or 0 for an empty matrix.
    pub fn max_diagonal(&self) -> f64 {
        self.diagonal().fold(0.0, f64::max)
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    pub fn diagonal(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.order).map(move |i| self.get(i, i))
    }
}

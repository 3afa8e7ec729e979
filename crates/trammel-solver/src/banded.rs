//! Band-aware LU path for square systems. Chain-like sketches produce
//! Jacobians whose nonzeros hug the diagonal (the equation ordering contract
//! guarantees entity rows precede constraint rows, each near its own
//! params), and elimination then never needs to look outside the band.
//!
//! No pivoting: a zero pivot inside the band falls back to the dense path.

use nalgebra::{DMatrix, DVector};

/// Maximum sub-diagonal width the banded path accepts.
pub const LEFT_OF_DIAG: usize = 8;
/// Maximum super-diagonal width the banded path accepts.
pub const RIGHT_OF_DIAG: usize = 8;

const PIVOT_TOL: f64 = 1e-12;

#[derive(Debug)]
pub struct BandedMatrix {
    n: usize,
    left: usize,
    right: usize,
    a: DMatrix<f64>,
}

impl BandedMatrix {
    /// Wrap a square matrix if its profile fits within the allowed band;
    /// `None` sends the caller to the dense path.
    pub fn from_square(a: &DMatrix<f64>) -> Option<Self> {
        let n = a.nrows();
        if n == 0 || a.ncols() != n {
            return None;
        }

        let mut left = 0usize;
        let mut right = 0usize;
        for i in 0..n {
            for j in 0..n {
                if a[(i, j)] != 0.0 {
                    if j < i {
                        left = left.max(i - j);
                    } else {
                        right = right.max(j - i);
                    }
                }
            }
        }
        if left > LEFT_OF_DIAG || right > RIGHT_OF_DIAG {
            return None;
        }
        // A band as wide as the matrix gains nothing.
        if left + right + 1 >= n {
            return None;
        }

        Some(Self {
            n,
            left,
            right,
            a: a.clone(),
        })
    }

    /// Solve `A x = b` by in-band LU without pivoting. `None` on a small
    /// pivot; the caller retries with the dense path.
    pub fn solve(mut self, b: &DVector<f64>) -> Option<DVector<f64>> {
        let n = self.n;
        let mut x = b.clone();

        // Forward elimination, touching only rows inside the band.
        for col in 0..n {
            let pivot = self.a[(col, col)];
            if pivot.abs() < PIVOT_TOL {
                return None;
            }
            let last_row = (col + self.left).min(n - 1);
            for row in (col + 1)..=last_row {
                let factor = self.a[(row, col)] / pivot;
                if factor == 0.0 {
                    continue;
                }
                let last_col = (col + self.right).min(n - 1);
                for j in col..=last_col {
                    self.a[(row, j)] -= factor * self.a[(col, j)];
                }
                x[row] -= factor * x[col];
            }
        }

        // Back substitution.
        for i in (0..n).rev() {
            let mut sum = x[i];
            let last_col = (i + self.right).min(n - 1);
            for j in (i + 1)..=last_col {
                sum -= self.a[(i, j)] * x[j];
            }
            let pivot = self.a[(i, i)];
            if pivot.abs() < PIVOT_TOL {
                return None;
            }
            x[i] = sum / pivot;
        }

        Some(x)
    }
}

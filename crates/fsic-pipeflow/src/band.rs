//! Banded matrix storage and direct (LU) solve.
//!
//! The Newton Jacobian assembled in [`crate::jacobian`] has fixed lower and
//! upper bandwidth 4: entry `(row, col)` is non-zero only when
//! `col - kl <= row <= col + ku`. Storing it densely would waste an `O(n)`
//! factor of memory and work for a banded `n = 2m+4` system; instead each
//! matrix column keeps only its `kl + ku + 1` possibly-nonzero rows,
//! addressed by the diagonal-offset convention `[A_u + row - col, col]`.
//!
//! Direct solve uses banded LU with partial pivoting. Partial pivoting can
//! grow the upper bandwidth by up to `kl` (a pivot swap may bring in a row
//! up to `kl` below the diagonal), so the factorization works in an
//! enlarged scratch buffer with `kl` extra superdiagonal rows, matching the
//! classic compact-band LU scheme (e.g. LAPACK's `*gbtrf`/`*gbtrs`, or
//! Press et al.'s `bandec`/`banbks`).

use fsic_core::Real;

use crate::error::{PipeFlowError, PipeFlowResult};

/// A square banded matrix with lower bandwidth `kl` and upper bandwidth `ku`.
#[derive(Clone, Debug)]
pub struct BandMatrix {
    n: usize,
    kl: usize,
    ku: usize,
    /// Compact storage: `(kl + ku + 1)` rows by `n` columns, row-major.
    /// Logical `(row, col)` lives at `data[(ku + row - col) * n + col]`.
    data: Vec<Real>,
}

impl BandMatrix {
    pub fn zeros(n: usize, kl: usize, ku: usize) -> Self {
        Self {
            n,
            kl,
            ku,
            data: vec![0.0; (kl + ku + 1) * n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn band_row(&self, row: usize, col: usize) -> Option<usize> {
        let offset = self.ku as isize + row as isize - col as isize;
        if offset < 0 || offset as usize >= self.kl + self.ku + 1 {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Set entry `(row, col)`. Panics if outside the declared band — every
    /// caller in [`crate::jacobian`] only ever writes within-band entries,
    /// so an out-of-band write means the residual/Jacobian derivation has a
    /// bug, which should fail loudly rather than be silently dropped.
    pub fn set(&mut self, row: usize, col: usize, value: Real) {
        let band_row = self
            .band_row(row, col)
            .unwrap_or_else(|| panic!("entry ({row}, {col}) is outside the declared band"));
        self.data[band_row * self.n + col] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> Real {
        match self.band_row(row, col) {
            Some(band_row) => self.data[band_row * self.n + col],
            None => 0.0,
        }
    }

    /// Solve `self * x = rhs` in place, returning `x`. Consumes `self`
    /// because factorization overwrites the band storage.
    pub fn lu_solve(self, rhs: &[Real]) -> PipeFlowResult<Vec<Real>> {
        let n = self.n;
        let kl = self.kl;
        let ku = self.ku;
        if rhs.len() != n {
            return Err(PipeFlowError::InvalidArg {
                what: "rhs length does not match matrix dimension",
            });
        }

        // Enlarged scratch: kl extra superdiagonal rows absorb pivot fill-in.
        let work_rows = kl + ku + 1 + kl;
        let mut ab = vec![0.0; work_rows * n];
        for col in 0..n {
            for band_row in 0..(kl + ku + 1) {
                ab[(kl + band_row) * n + col] = self.data[band_row * n + col];
            }
        }
        // al[k][j] holds the multiplier used to eliminate row k+j (j in 1..=kl)
        // using pivot row k, needed again during forward substitution.
        let mut al = vec![0.0; kl * n];
        let mut pivot_of = vec![0usize; n];

        let at = |ab: &[Real], band_row: usize, col: usize| ab[band_row * n + col];
        let set_at = |ab: &mut [Real], band_row: usize, col: usize, v: Real| {
            ab[band_row * n + col] = v;
        };

        for k in 0..n {
            let width = (n - 1 - k).min(kl);

            // Partial pivot: choose the largest-magnitude candidate among
            // the pivot row and the `width` rows below it in column k.
            let mut best = at(&ab, kl, k).abs();
            let mut best_row = k;
            for j in 1..=width {
                let cand = at(&ab, kl + j, k).abs();
                if cand > best {
                    best = cand;
                    best_row = k + j;
                }
            }
            pivot_of[k] = best_row;

            if best == 0.0 {
                return Err(PipeFlowError::SingularMatrix {
                    what: format!("zero pivot at column {k}"),
                });
            }

            if best_row != k {
                // Swap row k and row `best_row` across every column the
                // band storage currently tracks for either row.
                for col in 0..n {
                    let br_k = kl as isize + k as isize - col as isize;
                    let br_b = kl as isize + best_row as isize - col as isize;
                    if br_k < 0 && br_b < 0 {
                        continue;
                    }
                    let vk = if br_k >= 0 && (br_k as usize) < work_rows {
                        at(&ab, br_k as usize, col)
                    } else {
                        0.0
                    };
                    let vb = if br_b >= 0 && (br_b as usize) < work_rows {
                        at(&ab, br_b as usize, col)
                    } else {
                        0.0
                    };
                    if br_k >= 0 && (br_k as usize) < work_rows {
                        set_at(&mut ab, br_k as usize, col, vb);
                    }
                    if br_b >= 0 && (br_b as usize) < work_rows {
                        set_at(&mut ab, br_b as usize, col, vk);
                    }
                }
            }

            let pivot_val = at(&ab, kl, k);
            for j in 1..=width {
                let row = k + j;
                let br_row_k = kl as isize + row as isize - k as isize;
                let factor = at(&ab, br_row_k as usize, k) / pivot_val;
                al[(j - 1) * n + k] = factor;
                for col in k..n.min(k + kl + ku + 1) {
                    let br_pivot = kl as isize + k as isize - col as isize;
                    let br_row = kl as isize + row as isize - col as isize;
                    let pivot_c = if br_pivot >= 0 && (br_pivot as usize) < work_rows {
                        at(&ab, br_pivot as usize, col)
                    } else {
                        0.0
                    };
                    if br_row >= 0 && (br_row as usize) < work_rows {
                        let old = at(&ab, br_row as usize, col);
                        set_at(&mut ab, br_row as usize, col, old - factor * pivot_c);
                    }
                }
                set_at(&mut ab, br_row_k as usize, k, 0.0);
            }
        }

        // Apply the same row swaps / eliminations to the RHS, then back-substitute.
        let mut x = rhs.to_vec();
        for k in 0..n {
            let best_row = pivot_of[k];
            if best_row != k {
                x.swap(k, best_row);
            }
            let width = (n - 1 - k).min(kl);
            for j in 1..=width {
                let factor = al[(j - 1) * n + k];
                x[k + j] -= factor * x[k];
            }
        }
        for k in (0..n).rev() {
            let mut sum = x[k];
            for col in (k + 1)..n.min(k + kl + ku + 1) {
                let br = kl as isize + k as isize - col as isize;
                if br >= 0 && (br as usize) < work_rows {
                    sum -= at(&ab, br as usize, col) * x[col];
                }
            }
            let br_diag = kl;
            x[k] = sum / at(&ab, br_diag, k);
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_from_band(bm: &BandMatrix) -> Vec<Vec<Real>> {
        let n = bm.n();
        let mut d = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                d[i][j] = bm.get(i, j);
            }
        }
        d
    }

    fn mat_vec(d: &[Vec<Real>], x: &[Real]) -> Vec<Real> {
        let n = d.len();
        let mut y = vec![0.0; n];
        for i in 0..n {
            for j in 0..n {
                y[i] += d[i][j] * x[j];
            }
        }
        y
    }

    #[test]
    fn tridiagonal_solve_matches_known_solution() {
        // Classic tridiagonal system: 2x_i - x_{i-1} - x_{i+1} = 1, solved
        // for a small n so we can check against a direct dense computation.
        let n = 6;
        let mut bm = BandMatrix::zeros(n, 1, 1);
        for i in 0..n {
            bm.set(i, i, 2.0);
            if i > 0 {
                bm.set(i, i - 1, -1.0);
            }
            if i + 1 < n {
                bm.set(i, i + 1, -1.0);
            }
        }
        let dense = dense_from_band(&bm);
        let rhs = vec![1.0; n];
        let x = bm.lu_solve(&rhs).unwrap();
        let reproduced = mat_vec(&dense, &x);
        for i in 0..n {
            assert!((reproduced[i] - rhs[i]).abs() < 1e-9, "row {i} mismatch");
        }
    }

    #[test]
    fn pentadiagonal_solve_matches_known_solution() {
        let n = 10;
        let mut bm = BandMatrix::zeros(n, 2, 2);
        for i in 0..n {
            bm.set(i, i, 6.0);
            if i > 0 {
                bm.set(i, i - 1, -2.0);
            }
            if i + 1 < n {
                bm.set(i, i + 1, -1.5);
            }
            if i > 1 {
                bm.set(i, i - 2, -0.5);
            }
            if i + 2 < n {
                bm.set(i, i + 2, -0.3);
            }
        }
        let dense = dense_from_band(&bm);
        let rhs: Vec<Real> = (0..n).map(|i| (i as Real + 1.0).sin()).collect();
        let x = bm.lu_solve(&rhs).unwrap();
        let reproduced = mat_vec(&dense, &x);
        for i in 0..n {
            assert!((reproduced[i] - rhs[i]).abs() < 1e-8, "row {i} mismatch");
        }
    }

    #[test]
    fn requires_pivoting_still_solves() {
        // Diagonal entries smaller than off-diagonal ones force a pivot swap.
        let n = 5;
        let mut bm = BandMatrix::zeros(n, 1, 1);
        for i in 0..n {
            bm.set(i, i, 0.01);
            if i > 0 {
                bm.set(i, i - 1, 1.0);
            }
            if i + 1 < n {
                bm.set(i, i + 1, 1.0);
            }
        }
        let dense = dense_from_band(&bm);
        let rhs: Vec<Real> = (0..n).map(|i| i as Real + 1.0).collect();
        let x = bm.lu_solve(&rhs).unwrap();
        let reproduced = mat_vec(&dense, &x);
        for i in 0..n {
            assert!((reproduced[i] - rhs[i]).abs() < 1e-6, "row {i} mismatch");
        }
    }
}

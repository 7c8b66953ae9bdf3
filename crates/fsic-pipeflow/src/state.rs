//! Ghost-inclusive state arrays shared by [`crate::residual`] and
//! [`crate::jacobian`].
//!
//! Every array has length `m + 2`: index `0` is the inlet ghost cell, `1..=m`
//! are the interior cell centers, and `m + 1` is the outlet ghost cell.

use fsic_core::Real;

#[derive(Clone, Debug)]
pub struct PipeFlowState {
    pub m: usize,
    pub dz: Real,
    pub dt: Real,
    pub cmk2: Real,
    /// Numerical damping from the central pressure discretization; recomputed
    /// each residual/Jacobian evaluation from `ureference`, `dz`, `dt`.
    pub alpha: Real,

    pub u: Vec<Real>,
    pub p: Vec<Real>,
    pub a: Vec<Real>,
    /// Previous time step's velocity (only `un[m+1]` is read, by the outlet
    /// characteristic BC).
    pub un: Vec<Real>,
    /// Previous time step's pressure (only `pn[m+1]` is read).
    pub pn: Vec<Real>,
    pub an: Vec<Real>,
}

impl PipeFlowState {
    /// Unknown-vector length: interleaved `[u, p]` pairs over `m + 2` cells.
    pub fn n_unknowns(&self) -> usize {
        2 * self.m + 4
    }

    /// Add the Newton step `dx = [du0, dp0, du1, dp1, ...]` in place.
    pub fn apply_step(&mut self, dx: &[Real]) {
        for i in 0..self.m + 2 {
            self.u[i] += dx[2 * i];
            self.p[i] += dx[2 * i + 1];
        }
    }
}

//! Banded Jacobian assembly for the staggered mass/momentum residual.
//!
//! Column order matches [`crate::residual::residual`]'s row order: unknown
//! `2*i` is velocity at cell `i`, unknown `2*i+1` is pressure at cell `i`.
//! The outlet row reads `un[m+1]` (the outlet cell), not the time-step
//! counter.

use crate::band::BandMatrix;
use crate::state::PipeFlowState;

pub const KL: usize = 4;
pub const KU: usize = 4;

pub fn jacobian(state: &PipeFlowState) -> BandMatrix {
    let m = state.m;
    let u = &state.u;
    let a = &state.a;
    let un = &state.un;
    let pn = &state.pn;
    let alpha = state.alpha;
    let dz = state.dz;
    let dt = state.dt;

    let n = state.n_unknowns();
    let mut j = BandMatrix::zeros(n, KL, KU);

    j.set(0, 0, 1.0);
    j.set(1, 1, 1.0);
    j.set(1, 3, -2.0);
    j.set(1, 5, 1.0);

    for i in 1..=m {
        let usign = u[i] > 0.0;
        let c_im1 = 2 * (i - 1);
        let c_i = 2 * i;
        let c_ip1 = 2 * (i + 1);
        let r_mass = 2 * i;
        let r_mom = 2 * i + 1;

        j.set(r_mass, c_im1, -(a[i] + a[i - 1]) / 4.0);
        j.set(
            r_mom,
            c_im1,
            -(if usign {
                u[i] + 2.0 * u[i - 1]
            } else {
                u[i]
            }) * (a[i] + a[i - 1])
                / 4.0,
        );
        j.set(r_mass, c_im1 + 1, -alpha);
        j.set(r_mom, c_im1 + 1, -(a[i] + a[i - 1]) / 4.0);

        j.set(r_mass, c_i, (a[i] + a[i + 1]) / 4.0 - (a[i] + a[i - 1]) / 4.0);
        j.set(
            r_mom,
            c_i,
            dz / dt * a[i]
                + (if usign {
                    2.0 * u[i] + u[i + 1]
                } else {
                    u[i + 1]
                }) * (a[i] + a[i + 1])
                    / 4.0
                - (if usign {
                    u[i - 1]
                } else {
                    2.0 * u[i] + u[i - 1]
                }) * (a[i] + a[i - 1])
                    / 4.0,
        );
        j.set(r_mass, c_i + 1, 2.0 * alpha);
        j.set(
            r_mom,
            c_i + 1,
            (-(a[i] + a[i + 1]) + (a[i] + a[i - 1])) / 4.0,
        );

        j.set(r_mass, c_ip1, (a[i] + a[i + 1]) / 4.0);
        j.set(
            r_mom,
            c_ip1,
            (if usign {
                u[i]
            } else {
                u[i] + 2.0 * u[i + 1]
            }) * (a[i] + a[i + 1])
                / 4.0,
        );
        j.set(r_mass, c_ip1 + 1, -alpha);
        j.set(r_mom, c_ip1 + 1, (a[i] + a[i + 1]) / 4.0);
    }

    let last = 2 * m + 2;
    j.set(last, last, 1.0);
    j.set(last, 2 * m, -2.0);
    j.set(last, 2 * m - 2, 1.0);
    let c = (state.cmk2 - pn[m + 1] / 2.0).sqrt() - (u[m + 1] - un[m + 1]) / 4.0;
    j.set(last + 1, last, -c);
    j.set(last + 1, last + 1, 1.0);

    j
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residual::residual;
    use fsic_core::Real;

    fn sample_state(m: usize) -> PipeFlowState {
        let n = m + 2;
        let mut u = vec![0.0; n];
        let mut a = vec![0.0; n];
        for i in 0..n {
            u[i] = 1.0 + 0.05 * i as Real;
            a[i] = 1.0 + 0.01 * i as Real;
        }
        let p: Vec<Real> = (0..n).map(|i| 10.0 - 0.2 * i as Real).collect();
        PipeFlowState {
            m,
            dz: 0.1,
            dt: 0.01,
            cmk2: 1.0e7,
            alpha: 0.2,
            un: u.clone(),
            pn: p.clone(),
            an: a.clone(),
            u,
            p,
            a,
        }
    }

    #[test]
    fn matches_finite_difference() {
        let state = sample_state(5);
        let u_inlet = state.u[0];
        let analytic = jacobian(&state);

        let eps = 1e-6;
        let n = state.n_unknowns();
        let f0 = residual(&state, u_inlet);
        for col in 0..n {
            let mut perturbed = state.clone();
            if col % 2 == 0 {
                perturbed.u[col / 2] += eps;
            } else {
                perturbed.p[col / 2] += eps;
            }
            let f1 = residual(&perturbed, u_inlet);
            for row in 0..n {
                let fd = (f1[row] - f0[row]) / eps;
                let exact = analytic.get(row, col);
                if exact != 0.0 || fd.abs() > 1e-3 {
                    assert!(
                        (fd - exact).abs() < 1e-2 * fd.abs().max(1.0),
                        "row {row} col {col}: fd={fd} analytic={exact}"
                    );
                }
            }
        }
    }
}

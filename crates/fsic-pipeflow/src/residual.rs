//! Residual assembly for the staggered mass/momentum discretization.
//!
//! Uses the interleaved `[u, p]` residual layout: entries
//! `0` and `1` are the inlet velocity/pressure-extrapolation rows, entries
//! `2*i`/`2*i+1` (`i` in `1..=m`) are the interior mass/momentum balances
//! with upwinding and Jameson-style pressure damping, and the last two
//! entries are the outlet extrapolation and characteristic non-reflecting
//! boundary condition.

use fsic_core::Real;

use crate::state::PipeFlowState;

pub fn residual(state: &PipeFlowState, u_inlet: Real) -> Vec<Real> {
    let m = state.m;
    let u = &state.u;
    let p = &state.p;
    let a = &state.a;
    let un = &state.un;
    let pn = &state.pn;
    let an = &state.an;
    let alpha = state.alpha;
    let dz = state.dz;
    let dt = state.dt;

    let mut f = vec![0.0; state.n_unknowns()];
    f[0] = u[0] - u_inlet;
    f[1] = p[0] - (2.0 * p[1] - p[2]);

    for i in 1..=m {
        let usign = u[i] > 0.0;
        let ur = if usign { u[i] } else { u[i + 1] };
        let ul = if usign { u[i - 1] } else { u[i] };

        f[2 * i] = dz / dt * (a[i] - an[i])
            + (u[i] + u[i + 1]) * (a[i] + a[i + 1]) / 4.0
            - (u[i] + u[i - 1]) * (a[i] + a[i - 1]) / 4.0
            - alpha * (p[i + 1] - 2.0 * p[i] + p[i - 1]);

        f[2 * i + 1] = dz / dt * (u[i] * a[i] - un[i] * an[i])
            + ur * (u[i] + u[i + 1]) * (a[i] + a[i + 1]) / 4.0
            - ul * (u[i] + u[i - 1]) * (a[i] + a[i - 1]) / 4.0
            + ((p[i + 1] - p[i]) * (a[i] + a[i + 1]) + (p[i] - p[i - 1]) * (a[i] + a[i - 1]))
                / 4.0;
    }

    f[2 * m + 2] = u[m + 1] - (2.0 * u[m] - u[m - 1]);
    // Outlet characteristic BC; reads un[m + 1] (the outlet cell), not the
    // time-step counter.
    let c = (state.cmk2 - pn[m + 1] / 2.0).sqrt() - (u[m + 1] - un[m + 1]) / 4.0;
    f[2 * m + 3] = p[m + 1] - 2.0 * (state.cmk2 - c * c);

    f
}

//! IQN-ILS should recover an exact linear coupling relationship after
//! enough history columns accumulate, since the secant Jacobian becomes
//! exact once the history spans the interface dimension.

use fsic_component::{Lifecycle, ResidualCoupler};
use fsic_coupler::{IqnIls, IqnIlsConfig};
use nalgebra::DVector;

/// A toy "structure solver" response `xt = A * x + b` with `A` invertible.
fn response(x: &DVector<f64>) -> DVector<f64> {
    // A deliberately non-trivial 2x2 linear map.
    let a11 = 0.6;
    let a12 = 0.1;
    let a21 = -0.2;
    let a22 = 0.5;
    DVector::from_row_slice(&[
        a11 * x[0] + a12 * x[1] + 0.3,
        a21 * x[0] + a22 * x[1] - 0.1,
    ])
}

#[test]
fn converges_faster_than_plain_fixed_point_iteration() {
    let mut coupler = IqnIls::new(IqnIlsConfig {
        min_significant: 1e-12,
        omega: 0.05,
    });
    coupler.initialize().unwrap();
    coupler.initializestep().unwrap();

    let mut x = DVector::from_row_slice(&[0.0, 0.0]);
    let mut last_norm = f64::INFINITY;
    let mut iters = 0;
    for k in 0..20 {
        let xt = response(&x);
        let r = &xt - &x;
        coupler.add(&x, &xt).unwrap();
        let norm = r.norm();
        last_norm = norm;
        iters = k + 1;
        if norm < 1e-10 {
            break;
        }
        let dx = coupler.predict(&r).unwrap();
        x += dx;
    }

    assert!(last_norm < 1e-8, "did not converge: residual {last_norm}");
    // Plain fixed-point (Picard) iteration on this map takes well over 20
    // steps to reach 1e-8 given the off-diagonal coupling; IQN-ILS with a
    // full-rank history should do it in a handful once enough columns
    // accumulate to span the 2-D interface.
    assert!(iters < 15, "took {iters} iterations, expected acceleration");
}

//! IQN-ILS: Interface Quasi-Newton coupler with inverse least-squares
//! Jacobian approximation (C4).
//!
//! Builds a secant approximation of the interface Jacobian from the history
//! of observed `(Δr, Δxt)` column pairs within the current time step —
//! newest column first — and solves the least-squares update via a QR
//! decomposition of the `Δr` history, pruning columns whose `R` diagonal
//! magnitude falls below `min_significant` (a near-singular column adds
//! numerical noise without adding independent information).

mod error;

pub use error::{CouplerError, CouplerResult};

use fsic_component::{ComponentResult, Lifecycle, ResidualCoupler};
use fsic_core::Real;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

#[derive(Clone, Copy, Debug)]
pub struct IqnIlsConfig {
    /// `R` diagonal magnitude below which a history column is pruned.
    pub min_significant: Real,
    /// Constant relaxation factor used as the very first update of a run,
    /// before any column history exists.
    pub omega: Real,
}

impl Default for IqnIlsConfig {
    fn default() -> Self {
        Self {
            min_significant: 1e-9,
            omega: 0.01,
        }
    }
}

pub struct IqnIls {
    cfg: IqnIlsConfig,

    v: DMatrix<Real>, // Δr history, newest column first
    w: DMatrix<Real>, // Δxt history, newest column first
    rref: DVector<Real>,
    xtref: DVector<Real>,

    initialized: bool,
    added: bool,
}

impl IqnIls {
    pub fn new(cfg: IqnIlsConfig) -> Self {
        Self {
            cfg,
            v: DMatrix::zeros(0, 0),
            w: DMatrix::zeros(0, 0),
            rref: DVector::zeros(0),
            xtref: DVector::zeros(0),
            initialized: false,
            added: false,
        }
    }

    fn prepend_column(mat: &DMatrix<Real>, col: &DVector<Real>) -> DMatrix<Real> {
        if mat.ncols() == 0 {
            DMatrix::from_column_slice(col.len(), 1, col.as_slice())
        } else {
            let mut out = DMatrix::zeros(col.len(), mat.ncols() + 1);
            out.set_column(0, col);
            for j in 0..mat.ncols() {
                let c = mat.column(j).clone_owned();
                out.set_column(j + 1, &c);
            }
            out
        }
    }

    /// Minimum-magnitude diagonal entry of `V`'s economic QR `R` factor, and
    /// the column index it came from.
    fn min_diag(v: &DMatrix<Real>) -> (Real, usize) {
        let r = v.clone().qr().r();
        let mut best = Real::INFINITY;
        let mut idx = 0;
        for (i, d) in r.diagonal().iter().enumerate() {
            if d.abs() < best {
                best = d.abs();
                idx = i;
            }
        }
        (best, idx)
    }
}

impl Default for IqnIls {
    fn default() -> Self {
        Self::new(IqnIlsConfig::default())
    }
}

impl Lifecycle for IqnIls {
    fn initialize(&mut self) -> ComponentResult<()> {
        if self.initialized {
            return Err(CouplerError::ContractViolation {
                what: "IqnIls already initialized",
            }
            .into());
        }
        self.initialized = true;
        Ok(())
    }

    fn initializestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(CouplerError::ContractViolation {
                what: "IqnIls not initialized",
            }
            .into());
        }
        self.v = DMatrix::zeros(0, 0);
        self.w = DMatrix::zeros(0, 0);
        self.rref = DVector::zeros(0);
        self.xtref = DVector::zeros(0);
        self.added = false;
        Ok(())
    }

    fn finalizestep(&mut self) -> ComponentResult<()> {
        if !self.added {
            return Err(CouplerError::ContractViolation {
                what: "no information added during step",
            }
            .into());
        }
        self.added = false;
        Ok(())
    }

    fn finalize(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(CouplerError::ContractViolation {
                what: "IqnIls not initialized",
            }
            .into());
        }
        self.initialized = false;
        Ok(())
    }
}

impl ResidualCoupler for IqnIls {
    fn add(&mut self, x: &DVector<Real>, xt: &DVector<Real>) -> ComponentResult<()> {
        let r = xt - x;
        if self.added {
            let dr = &r - &self.rref;
            let dxt = xt - &self.xtref;
            self.v = Self::prepend_column(&self.v, &dr);
            self.w = Self::prepend_column(&self.w, &dxt);
        }
        self.rref = r;
        self.xtref = xt.clone();
        self.added = true;
        Ok(())
    }

    fn predict(&mut self, r: &DVector<Real>) -> ComponentResult<DVector<Real>> {
        while self.v.ncols() > 0 {
            let (min_abs, idx) = Self::min_diag(&self.v);
            if min_abs < self.cfg.min_significant {
                debug!(
                    column = idx,
                    magnitude = min_abs,
                    threshold = self.cfg.min_significant,
                    "iqn-ils pruning near-singular history column"
                );
                self.v = self.v.clone().remove_column(idx);
                self.w = self.w.clone().remove_column(idx);
            } else {
                break;
            }
        }

        if self.v.ncols() > 0 {
            let qr = self.v.clone().qr();
            let q = qr.q();
            let rr = qr.r();
            let b = q.transpose() * (-r);
            let c = rr
                .solve_upper_triangular(&b)
                .ok_or(CouplerError::NoInformation)?;
            Ok(&self.w * &c + r)
        } else if self.added {
            Ok(r * self.cfg.omega)
        } else {
            Err(CouplerError::NoInformation.into())
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pruning_leaves_either_no_columns_or_a_significant_diagonal(
            values in prop::collection::vec((-10.0_f64..10.0, -10.0_f64..10.0), 2..8),
        ) {
            let min_significant = 1e-6;
            let mut c = IqnIls::new(IqnIlsConfig { min_significant, omega: 0.1 });
            c.initialize().unwrap();
            c.initializestep().unwrap();

            let mut x = DVector::from_row_slice(&[0.0, 0.0]);
            for (a, b) in values {
                let xt = DVector::from_row_slice(&[a, b]);
                c.add(&x, &xt).unwrap();
                let r = &xt - &x;
                if let Ok(dx) = c.predict(&r) {
                    x = &x + &dx;
                }

                if c.v.ncols() > 0 {
                    let (min_abs, _) = IqnIls::min_diag(&c.v);
                    prop_assert!(
                        min_abs >= min_significant,
                        "post-pruning column left with diagonal magnitude {min_abs} below threshold {min_significant}"
                    );
                }
            }
        }
    }
}

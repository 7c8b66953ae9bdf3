//! RelativeNormConvergence: stopping rule for the coupling iteration loop
//! based on the residual norm relative to the step's first iteration (C5).
//!
//! The first `add(r)` of a step only records `r0 = ||r||`; the running
//! residual `r` is only updated starting from the second `add(r)` onward,
//! with `k_min` guarding against a spuriously-satisfied single-iteration
//! step, since `r` otherwise still holds its step-initial value of zero.

mod error;

pub use error::{ConvergenceError, ConvergenceResult};

use fsic_component::{ComponentResult, ConvergenceMonitor, Lifecycle};
use fsic_core::Real;
use nalgebra::DVector;

#[derive(Clone, Copy, Debug)]
pub struct RelativeNormConfig {
    pub k_min: u32,
    pub min_tol: Real,
    pub rel_tol: Real,
}

impl Default for RelativeNormConfig {
    fn default() -> Self {
        Self {
            k_min: 1,
            min_tol: 1e-10,
            rel_tol: 1e-6,
        }
    }
}

pub struct RelativeNormConvergence {
    cfg: RelativeNormConfig,

    k: u32,
    r: Real,
    r0: Real,

    initialized: bool,
    added: bool,
}

impl RelativeNormConvergence {
    pub fn new(cfg: RelativeNormConfig) -> Self {
        Self {
            cfg,
            k: 0,
            r: 0.0,
            r0: 0.0,
            initialized: false,
            added: false,
        }
    }

    pub fn iteration_count(&self) -> u32 {
        self.k
    }

    pub fn residual_norm(&self) -> Real {
        self.r
    }
}

impl Default for RelativeNormConvergence {
    fn default() -> Self {
        Self::new(RelativeNormConfig::default())
    }
}

impl Lifecycle for RelativeNormConvergence {
    fn initialize(&mut self) -> ComponentResult<()> {
        if self.initialized {
            return Err(ConvergenceError::ContractViolation {
                what: "RelativeNormConvergence already initialized",
            }
            .into());
        }
        self.initialized = true;
        Ok(())
    }

    fn initializestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(ConvergenceError::ContractViolation {
                what: "RelativeNormConvergence not initialized",
            }
            .into());
        }
        self.k = 0;
        self.r = 0.0;
        self.r0 = 0.0;
        Ok(())
    }

    fn finalizestep(&mut self) -> ComponentResult<()> {
        if !self.added {
            return Err(ConvergenceError::ContractViolation {
                what: "no information added during step",
            }
            .into());
        }
        self.added = false;
        Ok(())
    }

    fn finalize(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(ConvergenceError::ContractViolation {
                what: "RelativeNormConvergence not initialized",
            }
            .into());
        }
        self.initialized = false;
        Ok(())
    }
}

impl ConvergenceMonitor for RelativeNormConvergence {
    fn add(&mut self, r: &DVector<Real>) -> ComponentResult<()> {
        self.k += 1;
        if self.added {
            self.r = r.norm();
        } else {
            self.r0 = r.norm();
            self.added = true;
        }
        Ok(())
    }

    fn issatisfied(&self) -> bool {
        self.r < (self.cfg.rel_tol * self.r0).max(self.cfg.min_tol) && self.k >= self.cfg.k_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(vals: &[Real]) -> DVector<Real> {
        DVector::from_row_slice(vals)
    }

    #[test]
    fn requires_k_min_iterations() {
        let mut c = RelativeNormConvergence::new(RelativeNormConfig {
            k_min: 2,
            min_tol: 1e-10,
            rel_tol: 1e-6,
        });
        c.initialize().unwrap();
        c.initializestep().unwrap();
        c.add(&v(&[1e-12])).unwrap(); // first add: only sets r0, r stays 0
        assert!(!c.issatisfied(), "k_min not yet reached");
        c.add(&v(&[1e-12])).unwrap();
        assert!(c.issatisfied());
    }

    #[test]
    fn is_monotone_in_residual_for_fixed_r0() {
        let mut small = RelativeNormConvergence::new(RelativeNormConfig {
            k_min: 1,
            min_tol: 1e-10,
            rel_tol: 1e-3,
        });
        small.initialize().unwrap();
        small.initializestep().unwrap();
        small.add(&v(&[1.0])).unwrap(); // r0 = 1
        small.add(&v(&[0.5])).unwrap(); // r = 0.5, rel_tol*r0 = 1e-3 -> not satisfied
        assert!(!small.issatisfied());

        let mut c = RelativeNormConvergence::new(RelativeNormConfig {
            k_min: 1,
            min_tol: 1e-10,
            rel_tol: 1e-3,
        });
        c.initialize().unwrap();
        c.initializestep().unwrap();
        c.add(&v(&[1.0])).unwrap();
        c.add(&v(&[1e-6])).unwrap(); // much smaller residual must still satisfy
        assert!(c.issatisfied());
    }

    #[test]
    fn finalizestep_without_add_is_rejected() {
        let mut c = RelativeNormConvergence::default();
        c.initialize().unwrap();
        c.initializestep().unwrap();
        assert!(c.finalizestep().is_err());
    }

    #[test]
    fn initializestep_resets_counters() {
        let mut c = RelativeNormConvergence::default();
        c.initialize().unwrap();
        c.initializestep().unwrap();
        c.add(&v(&[1.0])).unwrap();
        c.add(&v(&[0.1])).unwrap();
        c.finalizestep().unwrap();

        c.initializestep().unwrap();
        assert_eq!(c.iteration_count(), 0);
        assert_eq!(c.residual_norm(), 0.0);
    }
}

//! LinearExtrapolator: predicts each step's initial coupling guess by
//! linearly extrapolating the last two accepted interface states (C3).
//!
//! Keeps the triple `(xn, x, xp)` of previous/current/next-candidate
//! states: `predict()` computes `xp = 2*x - xn` as the coupling
//! iteration's first guess, `update()` records the value accepted at the
//! end of the iteration loop into `xp`, and `initializestep()` shifts the
//! window (`xn <- x`, `x <- xp`) at the start of the next time step.

mod error;

pub use error::{ExtrapolatorError, ExtrapolatorResult};

use fsic_component::{ComponentResult, Lifecycle, StepExtrapolator};
use fsic_core::Real;
use nalgebra::DVector;

pub struct LinearExtrapolator {
    xn: DVector<Real>,
    x: DVector<Real>,
    xp: DVector<Real>,

    initialized: bool,
    added: bool,
}

impl LinearExtrapolator {
    pub fn new() -> Self {
        Self {
            xn: DVector::zeros(0),
            x: DVector::zeros(0),
            xp: DVector::zeros(0),
            initialized: false,
            added: false,
        }
    }
}

impl Default for LinearExtrapolator {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for LinearExtrapolator {
    fn initialize(&mut self) -> ComponentResult<()> {
        if self.initialized {
            return Err(ExtrapolatorError::ContractViolation {
                what: "LinearExtrapolator already initialized",
            }
            .into());
        }
        self.initialized = true;
        Ok(())
    }

    fn initializestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(ExtrapolatorError::ContractViolation {
                what: "LinearExtrapolator not initialized",
            }
            .into());
        }
        self.xn = self.x.clone();
        self.x = self.xp.clone();
        Ok(())
    }

    fn finalizestep(&mut self) -> ComponentResult<()> {
        if !self.added {
            return Err(ExtrapolatorError::ContractViolation {
                what: "no information added during step",
            }
            .into());
        }
        self.added = false;
        Ok(())
    }

    fn finalize(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(ExtrapolatorError::ContractViolation {
                what: "LinearExtrapolator not initialized",
            }
            .into());
        }
        self.initialized = false;
        Ok(())
    }
}

impl StepExtrapolator for LinearExtrapolator {
    fn initialize_state(&mut self, x0: &DVector<Real>) {
        self.xp = x0.clone();
        self.x = x0.clone();
        self.xn = DVector::zeros(x0.len());
    }

    fn predict(&mut self) -> DVector<Real> {
        self.xp = 2.0 * &self.x - &self.xn;
        self.xp.clone()
    }

    fn update(&mut self, x: &DVector<Real>) -> ComponentResult<()> {
        self.xp = x.clone();
        self.added = true;
        Ok(())
    }
}

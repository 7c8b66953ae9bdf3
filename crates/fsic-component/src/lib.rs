//! fsic-component: shared lifecycle traits and error type for every
//! component role (`Solver`, `ResidualCoupler`, `StepExtrapolator`,
//! `ConvergenceMonitor`) participating in the coupling loop.

pub mod error;
pub mod traits;

pub use error::{ComponentError, ComponentResult};
pub use traits::{ConvergenceMonitor, Lifecycle, ResidualCoupler, Solver, StepExtrapolator};

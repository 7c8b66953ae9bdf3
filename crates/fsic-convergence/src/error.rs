//! Error type for the relative-norm convergence monitor.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConvergenceError {
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },
}

pub type ConvergenceResult<T> = Result<T, ConvergenceError>;

impl From<ConvergenceError> for ComponentError {
    fn from(e: ConvergenceError) -> Self {
        match e {
            ConvergenceError::ContractViolation { what } => {
                ComponentError::ContractViolation { what }
            }
        }
    }
}

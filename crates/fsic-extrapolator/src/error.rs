//! Error type for the linear step extrapolator.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExtrapolatorError {
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },
}

pub type ExtrapolatorResult<T> = Result<T, ExtrapolatorError>;

impl From<ExtrapolatorError> for ComponentError {
    fn from(e: ExtrapolatorError) -> Self {
        match e {
            ExtrapolatorError::ContractViolation { what } => {
                ComponentError::ContractViolation { what }
            }
        }
    }
}

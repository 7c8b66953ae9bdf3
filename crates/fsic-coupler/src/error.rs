//! Error type for the IQN-ILS coupler.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CouplerError {
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },

    #[error("No information to predict from: predict() called before any add()")]
    NoInformation,
}

pub type CouplerResult<T> = Result<T, CouplerError>;

impl From<CouplerError> for ComponentError {
    fn from(e: CouplerError) -> Self {
        match e {
            CouplerError::ContractViolation { what } => ComponentError::ContractViolation { what },
            CouplerError::NoInformation => ComponentError::Numerical {
                what: "no information to predict from".to_string(),
            },
        }
    }
}

//! Error types for the pipe-flow solver.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PipeFlowError {
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },

    #[error("Newton solve failed to converge: {what}")]
    ConvergenceFailed { what: String },

    #[error("Banded matrix is singular: {what}")]
    SingularMatrix { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("I/O error: {what}")]
    Io { what: String },
}

pub type PipeFlowResult<T> = Result<T, PipeFlowError>;

impl From<PipeFlowError> for ComponentError {
    fn from(e: PipeFlowError) -> Self {
        match e {
            PipeFlowError::ContractViolation { what } => ComponentError::ContractViolation { what },
            PipeFlowError::ConvergenceFailed { what } => ComponentError::Numerical { what },
            PipeFlowError::SingularMatrix { what } => ComponentError::Numerical { what },
            PipeFlowError::InvalidArg { what } => ComponentError::InvalidArg { what },
            PipeFlowError::Io { what } => ComponentError::Numerical { what },
        }
    }
}

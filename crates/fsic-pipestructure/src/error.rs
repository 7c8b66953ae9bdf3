//! Error types for the pipe-structure (ring-law) solver.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PipeStructureError {
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },

    #[error("Unphysical pressure at cell {cell}: {pressure} exceeds the ring-law's collapse limit {limit}")]
    UnphysicalPressure {
        cell: usize,
        pressure: f64,
        limit: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("I/O error: {what}")]
    Io { what: String },
}

pub type PipeStructureResult<T> = Result<T, PipeStructureError>;

impl From<PipeStructureError> for ComponentError {
    fn from(e: PipeStructureError) -> Self {
        match e {
            PipeStructureError::ContractViolation { what } => {
                ComponentError::ContractViolation { what }
            }
            PipeStructureError::UnphysicalPressure { .. } => ComponentError::NonPhysical {
                what: "pressure exceeds ring-law collapse limit",
            },
            PipeStructureError::InvalidArg { what } => ComponentError::InvalidArg { what },
            PipeStructureError::Io { what } => ComponentError::Numerical { what },
        }
    }
}

//! Error types shared by every component role.

use fsic_core::CoreError;
use thiserror::Error;

/// Errors raised by components participating in the coupling loop.
///
/// Variants cover the error-kind taxonomy this system distinguishes:
/// contract violation, numerical failure, configuration error. A
/// recoverable diagnostic (IQN-ILS column pruning) is not an error at all —
/// it is logged via `tracing` and never surfaces as a `ComponentError`.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    /// Lifecycle method called out of order (e.g. `calculate` before
    /// `initialize`, `finalizestep` with no prior `add`/`update`).
    #[error("Contract violation: {what}")]
    ContractViolation { what: &'static str },

    /// Newton non-convergence, unphysical pressure, empty predictor history
    /// with no relaxation fallback, etc.
    #[error("Numerical failure: {what}")]
    Numerical { what: String },

    /// Missing directory, missing required parameter, malformed settings.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<CoreError> for ComponentError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => ComponentError::Numerical {
                what: format!("non-finite value for {what}: {value}"),
            },
            CoreError::InvalidArg { what } => ComponentError::InvalidArg { what },
            CoreError::IndexOob { what, index, len } => ComponentError::Numerical {
                what: format!("{what} out of bounds (index={index}, len={len})"),
            },
            CoreError::Invariant { what } => ComponentError::ContractViolation { what },
        }
    }
}

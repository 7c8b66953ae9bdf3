//! Orchestrator-level error: a component failure annotated with where in
//! the two-level loop it happened.

use fsic_component::ComponentError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
#[error("step {step}, iteration {iteration}: {source}")]
pub struct CoupleError {
    pub step: u64,
    pub iteration: u32,
    #[source]
    pub source: ComponentError,
}

pub type CoupleResult<T> = Result<T, CoupleError>;

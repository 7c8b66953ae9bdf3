//! Errors raised while loading or instantiating a case.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Component(#[from] fsic_component::ComponentError),

    #[error(transparent)]
    PipeFlow(#[from] fsic_pipeflow::PipeFlowError),

    #[error(transparent)]
    PipeStructure(#[from] fsic_pipestructure::PipeStructureError),
}

pub type CaseResult<T> = Result<T, CaseError>;

//! Error type for the linear grid mapper.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MapperError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type MapperResult<T> = Result<T, MapperError>;

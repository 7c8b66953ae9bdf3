//! fsic-core: stable foundation for the FSI coupling kernel.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error kind)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;

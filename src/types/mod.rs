//! Type definitions for costlens

mod error;
mod usage;

pub use error::*;
pub use usage::*;

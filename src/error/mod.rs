//! Error module orchestrator.
//!
//! The concrete error enum lives in the private `types` module.

mod types;

pub use types::{BuilderError, Result};

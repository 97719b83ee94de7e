//! Helpers shared by every route group

pub mod tracing;
pub mod utils;

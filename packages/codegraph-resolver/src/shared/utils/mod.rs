//! Shared utilities

pub mod descriptor;
pub mod panic;

//! Common test utilities for codegraph-resolver
//!
//! Shared corpus fixtures and configs for the integration tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

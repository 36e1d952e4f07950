//! Test utilities for the helix client
//!
//! This module provides builders, mocks, and fixtures for testing.

pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

//! Common test utilities shared by the integration tests.

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

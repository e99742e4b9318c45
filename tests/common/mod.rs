//! Shared test utilities for logwise integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Builders default to timestamps relative to a fixed
//! instant so bucket placement is deterministic.

pub mod assertions;
pub mod builders;
pub mod fake_backend;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;

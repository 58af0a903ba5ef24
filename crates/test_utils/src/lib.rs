//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim workflow test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built claims and instants
//! - `builders`: Builder for claims with sensible defaults
//! - `assertions`: Assertion helpers for claim stage and approval state
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;

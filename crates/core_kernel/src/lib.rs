//! Core Kernel - Foundational types and utilities for the claim workflow
//!
//! This crate provides the building blocks shared by the domain and store crates:
//! - Strongly-typed identifiers for claims, tasks and sync runs
//! - Money types with precise decimal arithmetic
//! - Temporal helpers: injectable clocks, timezones and display labels
//! - Port error types for simulated external systems

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError, clock_time_label, waiting_label};
pub use identifiers::{ClaimId, TaskId, SyncRunId};
pub use ports::PortError;
pub use error::CoreError;

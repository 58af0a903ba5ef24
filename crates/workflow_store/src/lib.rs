//! Claim Workflow Store
//!
//! The store is the single source of truth for claims and the transient UI
//! state that presentation layers read. Every change arrives as an intent
//! and is applied by a pure reducer, one at a time, on a single actor task.
//!
//! # Flow
//!
//! ```text
//! UI / scheduler ──Intent──▶ mpsc ──▶ actor ──reduce──▶ new Arc<WorkflowState>
//!                                       │                    │
//!                                       │ effects            ├─▶ watch (snapshots)
//!                                       ▼                    └─▶ broadcast (events)
//!                               timers, EHR port
//! ```
//!
//! The EHR sync simulator is the only part of the system that schedules
//! future work. Its delayed phases re-enter through the same channel as user
//! intents, so no two mutations ever interleave.

pub mod config;
pub mod error;
pub mod events;
pub mod intent;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod store;
pub mod sync;

pub use config::WorkflowConfig;
pub use error::{SeedError, StoreError};
pub use events::WorkflowEvent;
pub use intent::{Action, Intent, RuntimeEvent};
pub use reducer::{reduce, Effect, ReduceContext, Reduction};
pub use seed::SeedData;
pub use state::{DetailTab, StageInfo, Tab, UiState, WorkflowState, WorkflowView};
pub use store::{WorkflowStore, WorkflowStoreBuilder};
pub use sync::{SyncPhase, SyncSchedule};

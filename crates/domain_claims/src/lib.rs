//! Claim Review Domain
//!
//! This crate models a healthcare claim as it moves through automated review:
//! EHR ingestion, AI suggestion generation, human approval, and submission.
//!
//! # Stage Machine
//!
//! ```text
//! new -> ai-review -> pending -> submitted
//! ```
//!
//! Stages only ever move forward. Free-text status values refine a stage
//! without being part of the machine.

pub mod claim;
pub mod suggestion;
pub mod status;
pub mod approval;
pub mod workflow;
pub mod ports;
pub mod error;

pub use claim::{Claim, PlaceOfService, Stage, SubmissionDetails};
pub use suggestion::{AiSuggestion, SuggestionKind};
pub use approval::{approve, ApprovalOutcome, SuggestionSelection};
pub use workflow::{Task, TaskKind};
pub use ports::EhrPort;
pub use error::ClaimError;

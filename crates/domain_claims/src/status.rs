//! Status labels shown alongside a claim's stage
//!
//! Status is free text. These are the values the workflow itself writes;
//! seed data and external collaborators may use others.

pub const SYNCING_FROM_EHR: &str = "Syncing from EHR...";
pub const QUEUED_FOR_AI_REVIEW: &str = "Queued for AI review";
pub const ANALYZING: &str = "Analyzing...";
pub const REVIEW_COMPLETE: &str = "Review Complete";
pub const CHANGES_APPLIED: &str = "Changes Applied";
pub const ACCEPTED: &str = "Accepted";
pub const REJECTED: &str = "Rejected";

/// Time-in-stage marker for a claim that just arrived
pub const JUST_NOW: &str = "Just now";

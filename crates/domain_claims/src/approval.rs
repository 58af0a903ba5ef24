//! Suggestion approval
//!
//! Approving suggestions is a pure computation over a claim: it returns the
//! updated claim and leaves storing it to the caller.
//!
//! Rules:
//! - A claim without suggestions cannot be approved; the call yields `None`.
//! - Targeted suggestions become approved. Untargeted ones keep whatever
//!   decision they had.
//! - Indices outside the suggestion list are skipped.
//! - The approver and time are stamped on every call, and the status becomes
//!   `Changes Applied`.
//! - Only when every suggestion is approved does the claim graduate to
//!   `pending`. Claims already at or past `pending` never move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::claim::{Claim, Stage};
use crate::error::ClaimError;
use crate::status;

/// Which suggestions a reviewer is approving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSelection {
    All,
    Indices(BTreeSet<usize>),
}

impl SuggestionSelection {
    pub fn indices(indices: impl IntoIterator<Item = usize>) -> Self {
        SuggestionSelection::Indices(indices.into_iter().collect())
    }

    fn includes(&self, index: usize) -> bool {
        match self {
            SuggestionSelection::All => true,
            SuggestionSelection::Indices(set) => set.contains(&index),
        }
    }
}

impl From<Option<Vec<usize>>> for SuggestionSelection {
    /// `None` means "all", matching how reviewers call it from the detail view
    fn from(indices: Option<Vec<usize>>) -> Self {
        match indices {
            None => SuggestionSelection::All,
            Some(list) => SuggestionSelection::indices(list),
        }
    }
}

/// Result of an approval
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalOutcome {
    /// The claim after approval
    pub claim: Claim,
    /// Indices that were approved by this call
    pub applied: Vec<usize>,
    /// Requested indices that do not exist on the claim
    pub skipped: Vec<usize>,
    /// Stage before approval
    pub previous_stage: Stage,
}

impl ApprovalOutcome {
    /// True when this approval moved the claim to `pending`
    pub fn graduated(&self) -> bool {
        self.previous_stage != self.claim.stage
    }
}

/// Approves suggestions on a claim
pub fn approve(
    claim: &Claim,
    selection: &SuggestionSelection,
    approver: &str,
    at: DateTime<Utc>,
) -> Result<Option<ApprovalOutcome>, ClaimError> {
    let Some(suggestions) = claim.ai_suggestions.as_ref().filter(|s| !s.is_empty()) else {
        debug!(claim_id = %claim.id, "No suggestions to approve");
        return Ok(None);
    };

    let len = suggestions.len();
    let skipped: Vec<usize> = match selection {
        SuggestionSelection::All => Vec::new(),
        SuggestionSelection::Indices(set) => set.iter().copied().filter(|i| *i >= len).collect(),
    };
    if !skipped.is_empty() {
        debug!(claim_id = %claim.id, ?skipped, "Skipping out-of-range suggestion indices");
    }

    let mut updated = claim.clone();
    let mut applied = Vec::new();
    if let Some(list) = updated.ai_suggestions.as_mut() {
        for (index, suggestion) in list.iter_mut().enumerate() {
            if selection.includes(index) {
                suggestion.approved = Some(true);
                applied.push(index);
            }
        }
    }

    updated.approved_by = Some(approver.to_string());
    updated.approved_at = Some(at);
    updated.status = status::CHANGES_APPLIED.to_string();

    if updated.all_suggestions_approved() && updated.stage < Stage::Pending {
        updated.advance_stage(Stage::Pending)?;
    }

    Ok(Some(ApprovalOutcome {
        claim: updated,
        applied,
        skipped,
        previous_stage: claim.stage,
    }))
}

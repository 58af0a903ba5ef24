//! Commands the store accepts
//!
//! [`Intent`]s come from presentation collaborators. [`RuntimeEvent`]s are
//! produced by the store's own scheduler and cannot be dispatched from
//! outside. Both reach the reducer wrapped in an [`Action`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{ClaimId, SyncRunId, TaskId};
use domain_claims::{Claim, SuggestionSelection};

use crate::state::{DetailTab, Tab, WorkflowView};
use crate::sync::SyncPhase;

/// An externally issued intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    SetActiveTab(Tab),
    SetWorkflowView(WorkflowView),
    SetActiveDetailTab(DetailTab),
    /// Expands or collapses a table row
    ToggleRowExpanded(ClaimId),
    SetOpenDropdown(Option<String>),

    ToggleClaimSelection(ClaimId),
    /// Selects exactly these claims, or clears the selection if it already equals them
    ToggleAllClaims(Vec<ClaimId>),
    ClearClaimSelection,
    ToggleTaskSelection(TaskId),
    ToggleAllTasks(Vec<TaskId>),
    ClearTaskSelection,

    /// Opens a claim in the detail panel, resetting the panel
    SetSelectedClaim(Option<ClaimId>),
    /// Refreshes the open claim without touching the rest of the UI state
    UpdateSelectedClaim(Claim),
    SetSelectedSuggestions(BTreeSet<usize>),
    ToggleSuggestionSelection(usize),
    SetShowFullCms1500(bool),

    ApproveSuggestions {
        claim_id: ClaimId,
        selection: SuggestionSelection,
        approver: Option<String>,
    },
    SyncFromEhr,
    RemoveClaim(ClaimId),
}

/// Work the store scheduled for itself, arriving later
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    EhrClaimsFetched {
        run_id: SyncRunId,
        claims: Vec<Claim>,
    },
    EhrFetchFailed {
        run_id: SyncRunId,
        reason: String,
    },
    SyncPhaseDue {
        claim_id: ClaimId,
        phase: SyncPhase,
    },
}

/// Anything the reducer applies
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    User(Intent),
    Runtime(RuntimeEvent),
}

impl From<Intent> for Action {
    fn from(intent: Intent) -> Self {
        Action::User(intent)
    }
}

impl From<RuntimeEvent> for Action {
    fn from(event: RuntimeEvent) -> Self {
        Action::Runtime(event)
    }
}

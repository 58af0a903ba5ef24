//! Domain events emitted by the reducer
//!
//! Events record what changed in the claim list. UI-only intents emit none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, SyncRunId};
use domain_claims::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    /// A sync request was accepted
    SyncStarted {
        run_id: SyncRunId,
    },

    /// New claims were appended from the EHR
    ClaimsIngested {
        run_id: SyncRunId,
        claim_ids: Vec<ClaimId>,
    },

    /// The sync flag went back to idle
    SyncFinished {
        run_id: SyncRunId,
        injected: usize,
    },

    /// The EHR could not be reached
    SyncFailed {
        run_id: SyncRunId,
        reason: String,
    },

    ClaimStatusChanged {
        claim_id: ClaimId,
        status: String,
    },

    ClaimStageAdvanced {
        claim_id: ClaimId,
        from: Stage,
        to: Stage,
    },

    SuggestionsApproved {
        claim_id: ClaimId,
        approver: String,
        applied: Vec<usize>,
        timestamp: DateTime<Utc>,
    },

    ClaimRemoved {
        claim_id: ClaimId,
    },
}

impl WorkflowEvent {
    /// The claim an event is about, if it concerns one claim
    pub fn claim_id(&self) -> Option<ClaimId> {
        match self {
            WorkflowEvent::ClaimStatusChanged { claim_id, .. }
            | WorkflowEvent::ClaimStageAdvanced { claim_id, .. }
            | WorkflowEvent::SuggestionsApproved { claim_id, .. }
            | WorkflowEvent::ClaimRemoved { claim_id } => Some(*claim_id),
            _ => None,
        }
    }
}

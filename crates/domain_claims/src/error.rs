//! Claims domain errors

use core_kernel::{ClaimId, MoneyError};
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid stage transition for claim {claim_id} from {from} to {to}")]
    InvalidStageTransition {
        claim_id: ClaimId,
        from: String,
        to: String,
    },

    #[error("Claim {0} has no CPT codes")]
    MissingCptCodes(ClaimId),

    #[error("Claim {0} has an approver without an approval time")]
    IncompleteApproval(ClaimId),

    #[error("Invalid billed amount: {0}")]
    InvalidBilledAmount(#[from] MoneyError),
}

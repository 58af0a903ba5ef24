//! EHR sync simulator
//!
//! A sync request waits an initial delay, then pulls the claims the EHR
//! offers and injects the ones the store does not hold yet. Each injected
//! claim then walks through three independently scheduled phases:
//!
//! ```text
//! +0   new        Syncing from EHR...
//! +2   new        Queued for AI review
//! +4   ai-review  Analyzing...
//! +14  ai-review  Review Complete
//! ```
//!
//! Phases are keyed by claim id and patch the claim in the live list when
//! they fire. A phase whose claim is gone, or has moved past the phase's
//! precondition, does nothing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use domain_claims::status;
use domain_claims::{AiSuggestion, Claim, ClaimError, Stage};

/// Scheduled step of an injected claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncPhase {
    Queued,
    Analyzing,
    ReviewComplete,
}

impl SyncPhase {
    /// Phases in firing order
    pub const ALL: [SyncPhase; 3] = [SyncPhase::Queued, SyncPhase::Analyzing, SyncPhase::ReviewComplete];

    /// Whether the phase still applies to the claim as it is now
    pub fn applies_to(&self, claim: &Claim) -> bool {
        match self {
            SyncPhase::Queued | SyncPhase::Analyzing => claim.stage == Stage::New,
            SyncPhase::ReviewComplete => {
                claim.stage == Stage::AiReview && claim.status == status::ANALYZING
            }
        }
    }

    /// Applies the phase to a claim
    ///
    /// `ai_results` are the suggestions held back at ingestion; they are
    /// attached when review completes.
    pub(crate) fn apply(
        &self,
        claim: &mut Claim,
        ai_results: Option<Vec<AiSuggestion>>,
    ) -> Result<(), ClaimError> {
        match self {
            SyncPhase::Queued => {
                claim.status = status::QUEUED_FOR_AI_REVIEW.to_string();
            }
            SyncPhase::Analyzing => {
                claim.advance_stage(Stage::AiReview)?;
                claim.status = status::ANALYZING.to_string();
            }
            SyncPhase::ReviewComplete => {
                claim.status = status::REVIEW_COMPLETE.to_string();
                if claim.ai_suggestions.is_none() {
                    claim.ai_suggestions = ai_results;
                }
            }
        }
        Ok(())
    }
}

/// Sync timing, in units of `unit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSchedule {
    pub unit: Duration,
    pub initial_delay_units: u32,
    pub queued_after_units: u32,
    pub analyzing_after_units: u32,
    pub review_complete_after_units: u32,
}

impl Default for SyncSchedule {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            initial_delay_units: 7,
            queued_after_units: 2,
            analyzing_after_units: 4,
            review_complete_after_units: 14,
        }
    }
}

impl SyncSchedule {
    /// Delay between a sync request and claim arrival
    pub fn initial_delay(&self) -> Duration {
        self.unit * self.initial_delay_units
    }

    /// Delay between claim arrival and a phase
    pub fn phase_delay(&self, phase: SyncPhase) -> Duration {
        let units = match phase {
            SyncPhase::Queued => self.queued_after_units,
            SyncPhase::Analyzing => self.analyzing_after_units,
            SyncPhase::ReviewComplete => self.review_complete_after_units,
        };
        self.unit * units
    }
}

/// Prepares an EHR claim for injection
///
/// Returns the claim as it enters the list plus the suggestions to attach
/// once review completes.
pub(crate) fn prepare_injection(mut claim: Claim) -> (Claim, Option<Vec<AiSuggestion>>) {
    let ai_results = claim.ai_suggestions.take();
    claim.stage = Stage::New;
    claim.status = status::SYNCING_FROM_EHR.to_string();
    claim.time_in_stage = status::JUST_NOW.to_string();
    (claim, ai_results)
}

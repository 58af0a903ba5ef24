//! Pre-built Test Fixtures

use chrono::{DateTime, TimeZone, Utc};
use domain_claims::status;
use domain_claims::{AiSuggestion, Claim, Stage, SuggestionKind};

use crate::builders::ClaimBuilder;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Mid-afternoon on a weekday, UTC
    pub fn review_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 19, 45, 0).unwrap()
    }
}

/// Fixture for claims at each point of the pipeline
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// AI review finished with `n` undecided suggestions
    pub fn reviewed(id: u64, n: usize) -> Claim {
        ClaimBuilder::new(id)
            .stage(Stage::AiReview)
            .status(status::REVIEW_COMPLETE)
            .undecided_suggestions(n)
            .build()
    }

    /// AI review still running, no suggestions yet
    pub fn analyzing(id: u64) -> Claim {
        ClaimBuilder::new(id)
            .stage(Stage::AiReview)
            .status(status::ANALYZING)
            .build()
    }

    /// A claim the EHR offers, carrying the suggestions its review will produce
    pub fn ehr_offer(id: u64) -> Claim {
        ClaimBuilder::new(id)
            .status("Ready to sync")
            .suggestions(vec![
                AiSuggestion::addition(SuggestionKind::Modifier, "25", "Separate E/M"),
                AiSuggestion::replace(SuggestionKind::Pos, "22", "11", "Office visit"),
            ])
            .build()
    }

    /// Approved and waiting for submission
    pub fn pending(id: u64) -> Claim {
        let mut claim = Self::reviewed(id, 1);
        if let Some(list) = claim.ai_suggestions.as_mut() {
            list[0].approved = Some(true);
        }
        ClaimBuilder::from_claim(claim)
            .stage(Stage::Pending)
            .status(status::CHANGES_APPLIED)
            .approved("Priya Patel", TemporalFixtures::review_time())
            .build()
    }
}

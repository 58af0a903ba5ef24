//! Test Data Builders
//!
//! Builders let tests spell out only the fields they care about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ClaimId, Money};
use domain_claims::status;
use domain_claims::{AiSuggestion, Claim, PlaceOfService, Stage, SubmissionDetails, SuggestionKind};
use rust_decimal_macros::dec;

/// Builder for constructing test claims
pub struct ClaimBuilder {
    claim: Claim,
}

impl ClaimBuilder {
    /// A new-stage office visit with one CPT code and no suggestions
    pub fn new(id: u64) -> Self {
        Self {
            claim: Claim {
                id: ClaimId::new(id),
                patient: format!("Patient {}", id),
                provider: "Dr. Amara Osei".to_string(),
                payer: "Aetna".to_string(),
                date_of_service: NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date"),
                stage: Stage::New,
                status: status::QUEUED_FOR_AI_REVIEW.to_string(),
                time_in_stage: "10m".to_string(),
                cpt_codes: vec!["99213".to_string()],
                icd10_codes: vec!["I10".to_string()],
                modifiers: Vec::new(),
                place_of_service: PlaceOfService::new("11", "Office"),
                expected_place_of_service: None,
                billed_amount: Money::usd(dec!(112.00)),
                ai_suggestions: None,
                approved_by: None,
                approved_at: None,
                submission: SubmissionDetails::default(),
            },
        }
    }

    /// Starts from an existing claim
    pub fn from_claim(claim: Claim) -> Self {
        Self { claim }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.claim.stage = stage;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.claim.status = status.into();
        self
    }

    pub fn patient(mut self, patient: impl Into<String>) -> Self {
        self.claim.patient = patient.into();
        self
    }

    pub fn billed(mut self, amount: Money) -> Self {
        self.claim.billed_amount = amount;
        self
    }

    pub fn cpt_codes(mut self, codes: &[&str]) -> Self {
        self.claim.cpt_codes = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Sets the suggestion list
    pub fn suggestions(mut self, suggestions: Vec<AiSuggestion>) -> Self {
        self.claim.ai_suggestions = Some(suggestions);
        self
    }

    /// Adds `n` undecided CPT suggestions
    pub fn undecided_suggestions(self, n: usize) -> Self {
        let suggestions = (0..n)
            .map(|i| {
                AiSuggestion::replace(
                    SuggestionKind::Cpt,
                    format!("9921{}", 5 - (i % 5)),
                    "99213",
                    format!("Suggestion {}", i),
                )
            })
            .collect();
        self.suggestions(suggestions)
    }

    pub fn approved(mut self, by: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.claim.approved_by = Some(by.into());
        self.claim.approved_at = Some(at);
        self
    }

    pub fn rejected(mut self, at: DateTime<Utc>, code: impl Into<String>) -> Self {
        self.claim.submission.rejected_at = Some(at);
        self.claim.submission.rejection_code = Some(code.into());
        self
    }

    pub fn build(self) -> Claim {
        self.claim
    }
}

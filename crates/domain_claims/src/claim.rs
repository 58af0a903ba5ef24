//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{clock_time_label, ClaimId, Money, Timezone};
use crate::error::ClaimError;
use crate::suggestion::AiSuggestion;

/// Pipeline position of a claim
///
/// Ordering follows the pipeline, so `Stage::New < Stage::Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Arrived from the EHR, not yet analyzed
    New,
    /// AI review running or finished, awaiting human approval
    AiReview,
    /// Suggestions approved, ready for submission
    Pending,
    /// Sent to the clearinghouse
    Submitted,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 4] = [Stage::New, Stage::AiReview, Stage::Pending, Stage::Submitted];

    /// Wire name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::AiReview => "ai-review",
            Stage::Pending => "pending",
            Stage::Submitted => "submitted",
        }
    }

    /// The stage that follows this one, if any
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::New => Some(Stage::AiReview),
            Stage::AiReview => Some(Stage::Pending),
            Stage::Pending => Some(Stage::Submitted),
            Stage::Submitted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Submitted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Place-of-service code with its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOfService {
    pub code: String,
    pub description: String,
}

impl PlaceOfService {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Clearinghouse round-trip details
///
/// Written by the submission collaborator; the workflow core only reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearinghouse: Option<String>,
    #[serde(default)]
    pub is_resubmission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resubmission_attempt: Option<u32>,
}

/// A billable encounter moving through review and submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Identifier assigned by the EHR, never reused
    pub id: ClaimId,
    /// Patient display name
    pub patient: String,
    /// Rendering provider
    pub provider: String,
    /// Payer the claim is billed to
    pub payer: String,
    pub date_of_service: NaiveDate,
    pub stage: Stage,
    /// Free-text sub-state within the stage
    pub status: String,
    /// Display label for how long the claim has sat in its stage
    pub time_in_stage: String,
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub icd10_codes: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub place_of_service: PlaceOfService,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_place_of_service: Option<PlaceOfService>,
    pub billed_amount: Money,
    /// Present once AI review has produced output; never cleared afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<Vec<AiSuggestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub submission: SubmissionDetails,
}

impl Claim {
    /// Checks the structural invariants a claim must hold on ingestion
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.cpt_codes.is_empty() {
            return Err(ClaimError::MissingCptCodes(self.id));
        }
        if self.approved_by.is_some() != self.approved_at.is_some() {
            return Err(ClaimError::IncompleteApproval(self.id));
        }
        self.billed_amount.ensure_billable()?;
        Ok(())
    }

    /// Moves the claim forward in the pipeline
    pub fn advance_stage(&mut self, target: Stage) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidStageTransition {
                claim_id: self.id,
                from: self.stage.to_string(),
                to: target.to_string(),
            });
        }
        self.stage = target;
        Ok(())
    }

    /// Suggestions produced by AI review, empty if review has not run
    pub fn suggestions(&self) -> &[AiSuggestion] {
        self.ai_suggestions.as_deref().unwrap_or(&[])
    }

    /// True when AI review produced at least one suggestion
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions().is_empty()
    }

    /// True when every suggestion has been approved
    pub fn all_suggestions_approved(&self) -> bool {
        self.suggestions().iter().all(AiSuggestion::is_approved)
    }

    /// Pending, with nothing left to approve
    pub fn is_submission_ready(&self) -> bool {
        self.stage == Stage::Pending && self.all_suggestions_approved()
    }

    pub fn is_rejected(&self) -> bool {
        self.submission.rejected_at.is_some()
    }

    /// Approval time rendered as `h:mm AM/PM` in the given timezone
    pub fn approved_at_label(&self, tz: Timezone) -> Option<String> {
        self.approved_at.map(|at| clock_time_label(at, tz))
    }

    fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        // Approval may graduate a claim that is still being synced.
        matches!(
            (self.stage, target),
            (New, AiReview) |
            (New, Pending) |
            (AiReview, Pending) |
            (Pending, Submitted)
        )
    }
}

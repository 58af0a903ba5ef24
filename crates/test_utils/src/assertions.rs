//! Custom Test Assertions
//!
//! Assertion helpers that print the claim's id, stage and status when they fail.

use domain_claims::{Claim, Stage};

/// Asserts a claim's stage
pub fn assert_stage(claim: &Claim, expected: Stage) {
    assert_eq!(
        claim.stage, expected,
        "Claim {} expected stage {}, got {} (status {:?})",
        claim.id, expected, claim.stage, claim.status
    );
}

/// Asserts a claim's stage and status together
pub fn assert_stage_status(claim: &Claim, stage: Stage, status: &str) {
    assert_stage(claim, stage);
    assert_eq!(
        claim.status, status,
        "Claim {} in stage {} expected status {:?}, got {:?}",
        claim.id, claim.stage, status, claim.status
    );
}

/// Asserts the approval flag of every suggestion, in order
pub fn assert_approvals(claim: &Claim, expected: &[Option<bool>]) {
    let actual: Vec<Option<bool>> = claim.suggestions().iter().map(|s| s.approved).collect();
    assert_eq!(
        actual, expected,
        "Claim {} suggestion approvals differ",
        claim.id
    );
}

/// Asserts that every suggestion on a claim is approved
pub fn assert_all_approved(claim: &Claim) {
    assert!(
        claim.has_suggestions() && claim.all_suggestions_approved(),
        "Claim {} has suggestions that are not approved: {:?}",
        claim.id,
        claim.suggestions()
    );
}

//! Review tasks derived from claims

use serde::{Deserialize, Serialize};

use core_kernel::{waiting_label, ClaimId, TaskId};
use crate::claim::{Claim, Stage};
use crate::status;

/// Why a claim needs a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// AI review finished, suggestions await a reviewer
    HumanReview,
    /// Clearinghouse rejected the claim
    Rejected,
    /// A resubmission was rejected again
    ExpertReview,
    /// Approved and waiting to be sent
    ReadyToSubmit,
}

impl TaskKind {
    /// Minutes a task of this kind may wait before breaching its SLA
    pub fn sla_minutes(&self) -> u32 {
        match self {
            TaskKind::HumanReview => 240,
            TaskKind::Rejected => 120,
            TaskKind::ExpertReview => 480,
            TaskKind::ReadyToSubmit => 60,
        }
    }

    /// The kind of task a claim currently calls for, if any
    pub fn for_claim(claim: &Claim) -> Option<TaskKind> {
        match claim.stage {
            Stage::AiReview if claim.status == status::REVIEW_COMPLETE => Some(TaskKind::HumanReview),
            Stage::Pending => Some(TaskKind::ReadyToSubmit),
            Stage::Submitted if claim.is_rejected() => {
                if claim.submission.is_resubmission {
                    Some(TaskKind::ExpertReview)
                } else {
                    Some(TaskKind::Rejected)
                }
            }
            _ => None,
        }
    }
}

/// A read-only work item correlated to one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub claim_id: ClaimId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub patient: String,
    pub waiting: String,
    pub waiting_minutes: u32,
    pub sla_breached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl Task {
    /// Projects a claim into a task when it needs attention
    pub fn derive(
        id: TaskId,
        claim: &Claim,
        waiting_minutes: u32,
        assigned_to: Option<String>,
    ) -> Option<Task> {
        let kind = TaskKind::for_claim(claim)?;
        Some(Task {
            id,
            claim_id: claim.id,
            kind,
            patient: claim.patient.clone(),
            waiting: waiting_label(waiting_minutes),
            waiting_minutes,
            sla_breached: waiting_minutes > kind.sla_minutes(),
            assigned_to,
        })
    }

    /// Minutes left before the SLA is breached, zero once breached
    pub fn sla_remaining_minutes(&self) -> u32 {
        self.kind.sla_minutes().saturating_sub(self.waiting_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{PlaceOfService, SubmissionDetails};
    use chrono::{NaiveDate, TimeZone, Utc};
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn claim(stage: Stage, status: &str) -> Claim {
        Claim {
            id: ClaimId::new(3),
            patient: "Riley Moreno".into(),
            provider: "Dr. Amara Osei".into(),
            payer: "UnitedHealthcare".into(),
            date_of_service: NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
            stage,
            status: status.into(),
            time_in_stage: "3h".into(),
            cpt_codes: vec!["99213".into()],
            icd10_codes: vec![],
            modifiers: vec![],
            place_of_service: PlaceOfService::new("11", "Office"),
            expected_place_of_service: None,
            billed_amount: Money::usd(dec!(95)),
            ai_suggestions: None,
            approved_by: None,
            approved_at: None,
            submission: SubmissionDetails::default(),
        }
    }

    #[test]
    fn test_review_complete_needs_human_review() {
        let c = claim(Stage::AiReview, status::REVIEW_COMPLETE);
        let task = Task::derive(TaskId::new(1), &c, 300, None).unwrap();
        assert_eq!(task.kind, TaskKind::HumanReview);
        assert!(task.sla_breached);
        assert_eq!(task.waiting, "5h");
        assert_eq!(task.sla_remaining_minutes(), 0);
    }

    #[test]
    fn test_analyzing_claim_has_no_task() {
        let c = claim(Stage::AiReview, status::ANALYZING);
        assert!(Task::derive(TaskId::new(1), &c, 10, None).is_none());
    }

    #[test]
    fn test_pending_is_ready_to_submit() {
        let c = claim(Stage::Pending, status::CHANGES_APPLIED);
        let task = Task::derive(TaskId::new(2), &c, 30, Some("Priya Patel".into())).unwrap();
        assert_eq!(task.kind, TaskKind::ReadyToSubmit);
        assert!(!task.sla_breached);
        assert_eq!(task.sla_remaining_minutes(), 30);
    }

    #[test]
    fn test_rejections() {
        let mut c = claim(Stage::Submitted, status::REJECTED);
        c.submission = SubmissionDetails {
            rejected_at: Some(Utc.with_ymd_and_hms(2024, 4, 14, 9, 0, 0).unwrap()),
            rejection_code: Some("CO-16".into()),
            ..SubmissionDetails::default()
        };
        assert_eq!(TaskKind::for_claim(&c), Some(TaskKind::Rejected));

        c.submission.is_resubmission = true;
        c.submission.resubmission_attempt = Some(2);
        assert_eq!(TaskKind::for_claim(&c), Some(TaskKind::ExpertReview));
    }

    #[test]
    fn test_task_kind_serde() {
        assert_eq!(
            serde_json::to_string(&TaskKind::ReadyToSubmit).unwrap(),
            "\"ready-to-submit\""
        );
    }
}

//! Store state: the canonical claim list plus transient UI state

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{ClaimId, Currency, Money, MoneyError, TaskId};
use domain_claims::{AiSuggestion, Claim, Stage, Task};

/// Top-level navigation tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    Dashboard,
    Workflow,
    Tasks,
    Claims,
}

/// Layout of the workflow tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowView {
    #[default]
    Kanban,
    Table,
}

/// Sub-tab of the claim detail panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailTab {
    #[default]
    Details,
    Suggestions,
    Cms1500,
    History,
}

/// Display metadata for a kanban column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    pub stage: Stage,
    pub label: String,
    pub description: String,
}

/// Transient view state, never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub active_tab: Tab,
    pub workflow_view: WorkflowView,
    pub selected_claim: Option<Claim>,
    pub selected_claim_ids: BTreeSet<ClaimId>,
    pub selected_task_ids: BTreeSet<TaskId>,
    pub expanded_rows: BTreeSet<ClaimId>,
    pub active_detail_tab: DetailTab,
    pub open_dropdown: Option<String>,
    pub selected_suggestions: BTreeSet<usize>,
    #[serde(rename = "showFullCMS1500")]
    pub show_full_cms1500: bool,
    pub is_syncing_from_ehr: bool,
}

/// One immutable snapshot of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub claims: Vec<Claim>,
    pub tasks: Vec<Task>,
    pub stages: Vec<StageInfo>,
    pub team_members: Vec<String>,
    pub ui: UiState,
    /// AI output held back for synced claims until their review completes
    #[serde(skip)]
    pub(crate) pending_ai_results: BTreeMap<ClaimId, Vec<AiSuggestion>>,
}

impl WorkflowState {
    pub fn new(
        claims: Vec<Claim>,
        tasks: Vec<Task>,
        stages: Vec<StageInfo>,
        team_members: Vec<String>,
    ) -> Self {
        Self {
            claims,
            tasks,
            stages,
            team_members,
            ui: UiState::default(),
            pending_ai_results: BTreeMap::new(),
        }
    }

    /// Looks up a claim by id
    pub fn claim(&self, id: ClaimId) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == id)
    }

    pub fn contains_claim(&self, id: ClaimId) -> bool {
        self.claim(id).is_some()
    }

    pub fn contains_task(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub(crate) fn claim_mut(&mut self, id: ClaimId) -> Option<&mut Claim> {
        self.claims.iter_mut().find(|c| c.id == id)
    }

    /// Claims in one kanban column, in list order
    pub fn claims_in_stage(&self, stage: Stage) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(move |c| c.stage == stage)
    }

    /// Number of claims per stage, every stage present
    pub fn stage_counts(&self) -> BTreeMap<Stage, usize> {
        let mut counts: BTreeMap<Stage, usize> = Stage::ALL.iter().map(|s| (*s, 0)).collect();
        for claim in &self.claims {
            *counts.entry(claim.stage).or_default() += 1;
        }
        counts
    }

    /// Total billed amount of the claims in a stage
    pub fn billed_total(&self, stage: Stage) -> Result<Money, MoneyError> {
        Money::try_sum(Currency::USD, self.claims_in_stage(stage).map(|c| &c.billed_amount))
    }

    /// Tasks correlated to a claim
    pub fn tasks_for_claim(&self, id: ClaimId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.claim_id == id)
    }

    pub fn claim_ids(&self) -> Vec<ClaimId> {
        self.claims.iter().map(|c| c.id).collect()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// True while a sync run is between request and claim arrival
    pub fn is_syncing(&self) -> bool {
        self.ui.is_syncing_from_ehr
    }
}

//! Static seed data
//!
//! The initial claim list, tasks, stage metadata and team roster, plus the
//! larger set of claims the simulated EHR offers for sync.

use serde::Deserialize;

use domain_claims::{Claim, Task};
use crate::error::SeedError;
use crate::state::{StageInfo, WorkflowState};

const WORKFLOW_SEED: &str = include_str!("../seed/workflow.json");
const EHR_SEED: &str = include_str!("../seed/ehr_claims.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowSeed {
    claims: Vec<Claim>,
    tasks: Vec<Task>,
    stages: Vec<StageInfo>,
    team_members: Vec<String>,
}

/// Everything a store is initialised from
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub claims: Vec<Claim>,
    pub tasks: Vec<Task>,
    pub stages: Vec<StageInfo>,
    pub team_members: Vec<String>,
    /// Claims the EHR will offer when a sync runs
    pub ehr_claims: Vec<Claim>,
}

impl SeedData {
    /// The bundled demo data set
    pub fn demo() -> Result<Self, SeedError> {
        let workflow: WorkflowSeed = serde_json::from_str(WORKFLOW_SEED)
            .map_err(|source| SeedError::Parse { which: "workflow", source })?;
        let ehr_claims: Vec<Claim> = serde_json::from_str(EHR_SEED)
            .map_err(|source| SeedError::Parse { which: "ehr", source })?;

        let seed = Self {
            claims: workflow.claims,
            tasks: workflow.tasks,
            stages: workflow.stages,
            team_members: workflow.team_members,
            ehr_claims,
        };
        seed.validate()?;
        Ok(seed)
    }

    /// Checks every claim in the seed
    pub fn validate(&self) -> Result<(), SeedError> {
        for claim in self.claims.iter().chain(&self.ehr_claims) {
            claim.validate()?;
        }
        Ok(())
    }

    /// Initial store state built from this seed
    pub fn initial_state(&self) -> WorkflowState {
        WorkflowState::new(
            self.claims.clone(),
            self.tasks.clone(),
            self.stages.clone(),
            self.team_members.clone(),
        )
    }
}

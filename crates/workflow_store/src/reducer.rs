//! Pure reducer
//!
//! `reduce` applies one action to a state value and reports what changed
//! (events) and what the runtime should do next (effects). It never blocks
//! and never fails: intents that point at missing or settled targets leave
//! the state untouched.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use core_kernel::{ClaimId, SyncRunId, TaskId};
use domain_claims::{approve, Claim, SuggestionSelection};

use crate::events::WorkflowEvent;
use crate::intent::{Action, Intent, RuntimeEvent};
use crate::state::{DetailTab, WorkflowState};
use crate::sync::{prepare_injection, SyncPhase};

/// Inputs the reducer needs from outside the state
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub now: DateTime<Utc>,
    pub default_approver: &'a str,
}

/// Follow-up work for the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait the initial delay, then ask the EHR for claims
    FetchEhrClaims { run_id: SyncRunId },
    /// Schedule every sync phase for these freshly injected claims
    SchedulePhases { claim_ids: Vec<ClaimId> },
    /// Drop any phases still scheduled for a claim
    CancelPhases { claim_id: ClaimId },
}

/// What one action produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reduction {
    pub events: Vec<WorkflowEvent>,
    pub effects: Vec<Effect>,
}

impl Reduction {
    fn event(mut self, event: WorkflowEvent) -> Self {
        self.events.push(event);
        self
    }

    fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Applies an action to the state
pub fn reduce(state: &mut WorkflowState, action: Action, ctx: &ReduceContext<'_>) -> Reduction {
    match action {
        Action::User(intent) => reduce_intent(state, intent, ctx),
        Action::Runtime(event) => reduce_runtime(state, event),
    }
}

fn reduce_intent(state: &mut WorkflowState, intent: Intent, ctx: &ReduceContext<'_>) -> Reduction {
    match intent {
        Intent::SetActiveTab(tab) => {
            state.ui.active_tab = tab;
            Reduction::default()
        }
        Intent::SetWorkflowView(view) => {
            state.ui.workflow_view = view;
            Reduction::default()
        }
        Intent::SetActiveDetailTab(tab) => {
            state.ui.active_detail_tab = tab;
            Reduction::default()
        }
        Intent::ToggleRowExpanded(id) => {
            if state.contains_claim(id) {
                toggle(&mut state.ui.expanded_rows, id);
            } else {
                debug!(claim_id = %id, "Ignoring row toggle for unknown claim");
            }
            Reduction::default()
        }
        Intent::SetOpenDropdown(dropdown) => {
            state.ui.open_dropdown = dropdown;
            Reduction::default()
        }

        Intent::ToggleClaimSelection(id) => {
            if state.contains_claim(id) {
                toggle(&mut state.ui.selected_claim_ids, id);
            } else {
                debug!(claim_id = %id, "Ignoring selection toggle for unknown claim");
            }
            Reduction::default()
        }
        Intent::ToggleAllClaims(ids) => {
            let known: BTreeSet<ClaimId> =
                ids.into_iter().filter(|id| state.contains_claim(*id)).collect();
            toggle_all(&mut state.ui.selected_claim_ids, known);
            Reduction::default()
        }
        Intent::ClearClaimSelection => {
            state.ui.selected_claim_ids.clear();
            Reduction::default()
        }
        Intent::ToggleTaskSelection(id) => {
            if state.contains_task(id) {
                toggle(&mut state.ui.selected_task_ids, id);
            } else {
                debug!(task_id = %id, "Ignoring selection toggle for unknown task");
            }
            Reduction::default()
        }
        Intent::ToggleAllTasks(ids) => {
            let known: BTreeSet<TaskId> =
                ids.into_iter().filter(|id| state.contains_task(*id)).collect();
            toggle_all(&mut state.ui.selected_task_ids, known);
            Reduction::default()
        }
        Intent::ClearTaskSelection => {
            state.ui.selected_task_ids.clear();
            Reduction::default()
        }

        Intent::SetSelectedClaim(id) => {
            set_selected_claim(state, id);
            Reduction::default()
        }
        Intent::UpdateSelectedClaim(claim) => {
            update_selected_claim(state, claim);
            Reduction::default()
        }
        Intent::SetSelectedSuggestions(indices) => {
            let Some(len) = selected_suggestion_count(state) else {
                debug!("Ignoring suggestion selection without an open claim");
                return Reduction::default();
            };
            state.ui.selected_suggestions = indices.into_iter().filter(|i| *i < len).collect();
            Reduction::default()
        }
        Intent::ToggleSuggestionSelection(index) => {
            match selected_suggestion_count(state) {
                Some(len) if index < len => toggle(&mut state.ui.selected_suggestions, index),
                _ => debug!(index, "Ignoring toggle of unavailable suggestion"),
            }
            Reduction::default()
        }
        Intent::SetShowFullCms1500(show) => {
            state.ui.show_full_cms1500 = show;
            Reduction::default()
        }

        Intent::ApproveSuggestions { claim_id, selection, approver } => {
            let approver = approver.as_deref().unwrap_or(ctx.default_approver);
            approve_suggestions(state, claim_id, &selection, approver, ctx.now)
        }
        Intent::SyncFromEhr => start_sync(state),
        Intent::RemoveClaim(id) => remove_claim(state, id),
    }
}

fn reduce_runtime(state: &mut WorkflowState, event: RuntimeEvent) -> Reduction {
    match event {
        RuntimeEvent::EhrClaimsFetched { run_id, claims } => ingest(state, run_id, claims),
        RuntimeEvent::EhrFetchFailed { run_id, reason } => {
            warn!(%run_id, %reason, "EHR sync failed");
            state.ui.is_syncing_from_ehr = false;
            Reduction::default().event(WorkflowEvent::SyncFailed { run_id, reason })
        }
        RuntimeEvent::SyncPhaseDue { claim_id, phase } => advance_phase(state, claim_id, phase),
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn toggle_all<T: Ord>(selection: &mut BTreeSet<T>, full: BTreeSet<T>) {
    if *selection == full {
        selection.clear();
    } else {
        *selection = full;
    }
}

fn selected_suggestion_count(state: &WorkflowState) -> Option<usize> {
    state.ui.selected_claim.as_ref().map(|c| c.suggestions().len())
}

/// Opens a claim and resets the detail panel, even when reselecting the same claim
fn set_selected_claim(state: &mut WorkflowState, id: Option<ClaimId>) {
    let claim = match id {
        Some(id) => match state.claim(id) {
            Some(claim) => Some(claim.clone()),
            None => {
                debug!(claim_id = %id, "Ignoring selection of unknown claim");
                return;
            }
        },
        None => None,
    };

    state.ui.selected_claim = claim;
    state.ui.active_detail_tab = DetailTab::Details;
    state.ui.selected_suggestions.clear();
    state.ui.show_full_cms1500 = false;
}

fn update_selected_claim(state: &mut WorkflowState, claim: Claim) {
    match state.ui.selected_claim.as_mut() {
        Some(selected) if selected.id == claim.id => *selected = claim,
        _ => debug!(claim_id = %claim.id, "Ignoring update for a claim that is not open"),
    }
}

fn approve_suggestions(
    state: &mut WorkflowState,
    claim_id: ClaimId,
    selection: &SuggestionSelection,
    approver: &str,
    now: DateTime<Utc>,
) -> Reduction {
    let Some(claim) = state.claim(claim_id) else {
        debug!(claim_id = %claim_id, "Ignoring approval for unknown claim");
        return Reduction::default();
    };

    let outcome = match approve(claim, selection, approver, now) {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return Reduction::default(),
        Err(e) => {
            warn!(claim_id = %claim_id, error = %e, "Approval rejected by stage machine");
            return Reduction::default();
        }
    };

    let graduated = outcome.graduated();
    let updated = outcome.claim;
    info!(
        claim_id = %claim_id,
        approver,
        applied = outcome.applied.len(),
        stage = %updated.stage,
        "Suggestions approved"
    );

    let mut reduction = Reduction::default()
        .event(WorkflowEvent::SuggestionsApproved {
            claim_id,
            approver: approver.to_string(),
            applied: outcome.applied,
            timestamp: now,
        })
        .event(WorkflowEvent::ClaimStatusChanged {
            claim_id,
            status: updated.status.clone(),
        });
    if graduated {
        reduction = reduction.event(WorkflowEvent::ClaimStageAdvanced {
            claim_id,
            from: outcome.previous_stage,
            to: updated.stage,
        });
    }

    replace_claim(state, updated);
    reduction
}

/// Writes a claim back into the list and refreshes the detail panel if it is open
fn replace_claim(state: &mut WorkflowState, claim: Claim) {
    if let Some(slot) = state.claim_mut(claim.id) {
        *slot = claim.clone();
    }
    update_selected_claim(state, claim);
}

fn start_sync(state: &mut WorkflowState) -> Reduction {
    if state.ui.is_syncing_from_ehr {
        debug!("Sync already in progress");
        return Reduction::default();
    }

    let run_id = SyncRunId::new_v7();
    info!(%run_id, "EHR sync requested");
    state.ui.is_syncing_from_ehr = true;
    Reduction::default()
        .event(WorkflowEvent::SyncStarted { run_id })
        .effect(Effect::FetchEhrClaims { run_id })
}

fn ingest(state: &mut WorkflowState, run_id: SyncRunId, offered: Vec<Claim>) -> Reduction {
    if !state.ui.is_syncing_from_ehr {
        debug!(%run_id, "Dropping EHR result outside a sync run");
        return Reduction::default();
    }
    state.ui.is_syncing_from_ehr = false;

    let mut injected = Vec::new();
    for claim in offered {
        if state.contains_claim(claim.id) {
            continue;
        }
        if let Err(e) = claim.validate() {
            warn!(%run_id, claim_id = %claim.id, error = %e, "Skipping invalid EHR claim");
            continue;
        }
        let (claim, ai_results) = prepare_injection(claim);
        if let Some(results) = ai_results {
            state.pending_ai_results.insert(claim.id, results);
        }
        injected.push(claim.id);
        state.claims.push(claim);
    }

    info!(%run_id, injected = injected.len(), "EHR sync finished");
    let mut reduction = Reduction::default();
    if !injected.is_empty() {
        reduction = reduction
            .event(WorkflowEvent::ClaimsIngested {
                run_id,
                claim_ids: injected.clone(),
            })
            .effect(Effect::SchedulePhases {
                claim_ids: injected.clone(),
            });
    }
    reduction.event(WorkflowEvent::SyncFinished {
        run_id,
        injected: injected.len(),
    })
}

fn advance_phase(state: &mut WorkflowState, claim_id: ClaimId, phase: SyncPhase) -> Reduction {
    let Some(claim) = state.claim(claim_id) else {
        debug!(claim_id = %claim_id, ?phase, "Sync phase for a claim that is gone");
        return Reduction::default();
    };
    if !phase.applies_to(claim) {
        debug!(claim_id = %claim_id, ?phase, stage = %claim.stage, "Sync phase no longer applies");
        if phase == SyncPhase::ReviewComplete {
            state.pending_ai_results.remove(&claim_id);
        }
        return Reduction::default();
    }

    let previous_stage = claim.stage;
    let mut updated = claim.clone();
    let ai_results = match phase {
        SyncPhase::ReviewComplete => state.pending_ai_results.remove(&claim_id),
        _ => None,
    };
    if let Err(e) = phase.apply(&mut updated, ai_results) {
        warn!(claim_id = %claim_id, ?phase, error = %e, "Sync phase rejected by stage machine");
        return Reduction::default();
    }

    debug!(claim_id = %claim_id, ?phase, status = %updated.status, "Sync phase applied");
    let mut reduction = Reduction::default();
    if updated.stage != previous_stage {
        reduction = reduction.event(WorkflowEvent::ClaimStageAdvanced {
            claim_id,
            from: previous_stage,
            to: updated.stage,
        });
    }
    reduction = reduction.event(WorkflowEvent::ClaimStatusChanged {
        claim_id,
        status: updated.status.clone(),
    });

    replace_claim(state, updated);
    reduction
}

fn remove_claim(state: &mut WorkflowState, id: ClaimId) -> Reduction {
    let before = state.claims.len();
    state.claims.retain(|c| c.id != id);
    if state.claims.len() == before {
        debug!(claim_id = %id, "Ignoring removal of unknown claim");
        return Reduction::default();
    }

    state.pending_ai_results.remove(&id);
    state.ui.selected_claim_ids.remove(&id);
    state.ui.expanded_rows.remove(&id);

    let removed_tasks: Vec<TaskId> = state.tasks_for_claim(id).map(|t| t.id).collect();
    state.tasks.retain(|t| t.claim_id != id);
    for task_id in &removed_tasks {
        state.ui.selected_task_ids.remove(task_id);
    }

    if state.ui.selected_claim.as_ref().is_some_and(|c| c.id == id) {
        state.ui.selected_claim = None;
        state.ui.selected_suggestions.clear();
        state.ui.show_full_cms1500 = false;
    }

    info!(claim_id = %id, tasks = removed_tasks.len(), "Claim removed");
    Reduction::default()
        .event(WorkflowEvent::ClaimRemoved { claim_id: id })
        .effect(Effect::CancelPhases { claim_id: id })
}

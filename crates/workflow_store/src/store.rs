//! Store runtime
//!
//! [`WorkflowStore`] is a cheap, cloneable handle to a single actor task that
//! owns the state. Every intent, user-issued or scheduled, goes through one
//! unbounded channel and is reduced to completion before the next is read.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use core_kernel::{Clock, ClaimId, SyncRunId, SystemClock, TaskId, Timezone};
use domain_claims::ports::mock::MockEhrPort;
use domain_claims::{Claim, EhrPort, SuggestionSelection};

use crate::config::WorkflowConfig;
use crate::error::StoreError;
use crate::events::WorkflowEvent;
use crate::intent::{Action, Intent, RuntimeEvent};
use crate::reducer::{reduce, Effect, ReduceContext};
use crate::seed::SeedData;
use crate::state::{DetailTab, Tab, WorkflowState, WorkflowView};
use crate::sync::{SyncPhase, SyncSchedule};

const EVENT_CAPACITY: usize = 256;

type Snapshot = Arc<WorkflowState>;

enum Command {
    Dispatch {
        action: Action,
        reply: Option<oneshot::Sender<Snapshot>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Builder for a running store
#[derive(Default)]
pub struct WorkflowStoreBuilder {
    config: Option<WorkflowConfig>,
    seed: Option<SeedData>,
    ehr: Option<Arc<dyn EhrPort>>,
    clock: Option<Arc<dyn Clock>>,
}

impl WorkflowStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn seed(mut self, seed: SeedData) -> Self {
        self.seed = Some(seed);
        self
    }

    /// EHR to sync from; defaults to a mock serving the seed's EHR claims
    pub fn ehr(mut self, ehr: Arc<dyn EhrPort>) -> Self {
        self.ehr = Some(ehr);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Spawns the store actor
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<WorkflowStore, StoreError> {
        let config = self.config.unwrap_or_default();
        let timezone = config.timezone()?;
        let seed = self.seed.unwrap_or_default();
        seed.validate()?;

        let ehr = self
            .ehr
            .unwrap_or_else(|| Arc::new(MockEhrPort::new(seed.ehr_claims.clone())));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let initial: Snapshot = Arc::new(seed.initial_state());
        let (commands, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let runtime = StoreRuntime {
            state: initial,
            schedule: config.schedule(),
            default_approver: config.default_approver.clone(),
            ehr,
            clock,
            commands: commands.downgrade(),
            snapshots: snapshot_tx,
            events: events.clone(),
            scheduled: HashMap::new(),
            fetches: Vec::new(),
        };
        tokio::spawn(runtime.run(receiver));

        info!(
            claims = seed.claims.len(),
            ehr_offers = seed.ehr_claims.len(),
            timezone = %timezone,
            "Workflow store started"
        );

        Ok(WorkflowStore {
            commands,
            snapshots: snapshot_rx,
            events,
            timezone,
        })
    }
}

/// Handle to a running workflow store
#[derive(Clone)]
pub struct WorkflowStore {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    events: broadcast::Sender<WorkflowEvent>,
    timezone: Timezone,
}

impl WorkflowStore {
    pub fn builder() -> WorkflowStoreBuilder {
        WorkflowStoreBuilder::new()
    }

    /// Applies an intent and returns the snapshot it produced
    pub async fn dispatch(&self, intent: Intent) -> Result<Snapshot, StoreError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Dispatch {
                action: Action::User(intent),
                reply: Some(reply),
            })
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every new snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Receiver for domain events
    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Timezone used for approval labels
    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Stops the actor and aborts every scheduled sync phase
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Shutdown { reply })
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)
    }

    pub async fn set_active_tab(&self, tab: Tab) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SetActiveTab(tab)).await
    }

    pub async fn set_workflow_view(&self, view: WorkflowView) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SetWorkflowView(view)).await
    }

    pub async fn set_active_detail_tab(&self, tab: DetailTab) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SetActiveDetailTab(tab)).await
    }

    pub async fn toggle_row_expanded(&self, id: ClaimId) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ToggleRowExpanded(id)).await
    }

    pub async fn toggle_claim_selection(&self, id: ClaimId) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ToggleClaimSelection(id)).await
    }

    pub async fn toggle_all_claims(&self, ids: Vec<ClaimId>) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ToggleAllClaims(ids)).await
    }

    pub async fn clear_claim_selection(&self) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ClearClaimSelection).await
    }

    pub async fn toggle_task_selection(&self, id: TaskId) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ToggleTaskSelection(id)).await
    }

    pub async fn toggle_all_tasks(&self, ids: Vec<TaskId>) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ToggleAllTasks(ids)).await
    }

    pub async fn clear_task_selection(&self) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ClearTaskSelection).await
    }

    pub async fn set_selected_claim(&self, id: Option<ClaimId>) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SetSelectedClaim(id)).await
    }

    pub async fn update_selected_claim(&self, claim: Claim) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::UpdateSelectedClaim(claim)).await
    }

    pub async fn set_selected_suggestions(
        &self,
        indices: BTreeSet<usize>,
    ) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SetSelectedSuggestions(indices)).await
    }

    /// Approves suggestions; `None` indices approves all of them
    pub async fn approve_suggestions(
        &self,
        claim_id: ClaimId,
        indices: Option<Vec<usize>>,
        approver: Option<&str>,
    ) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::ApproveSuggestions {
            claim_id,
            selection: SuggestionSelection::from(indices),
            approver: approver.map(str::to_string),
        })
        .await
    }

    pub async fn sync_from_ehr(&self) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::SyncFromEhr).await
    }

    pub async fn remove_claim(&self, id: ClaimId) -> Result<Snapshot, StoreError> {
        self.dispatch(Intent::RemoveClaim(id)).await
    }
}

/// The actor that owns the state
struct StoreRuntime {
    state: Snapshot,
    schedule: SyncSchedule,
    default_approver: String,
    ehr: Arc<dyn EhrPort>,
    clock: Arc<dyn Clock>,
    commands: mpsc::WeakUnboundedSender<Command>,
    snapshots: watch::Sender<Snapshot>,
    events: broadcast::Sender<WorkflowEvent>,
    scheduled: HashMap<ClaimId, Vec<JoinHandle<()>>>,
    fetches: Vec<JoinHandle<()>>,
}

impl StoreRuntime {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Dispatch { action, reply } => {
                    let snapshot = self.apply(action);
                    if let Some(reply) = reply {
                        let _ = reply.send(snapshot);
                    }
                }
                Command::Shutdown { reply } => {
                    self.abort_all();
                    let _ = reply.send(());
                    break;
                }
            }
        }
        info!("Workflow store stopped");
    }

    fn apply(&mut self, action: Action) -> Snapshot {
        let ctx = ReduceContext {
            now: self.clock.now(),
            default_approver: &self.default_approver,
        };
        let mut next = (*self.state).clone();
        let reduction = reduce(&mut next, action, &ctx);

        self.state = Arc::new(next);
        self.snapshots.send_replace(self.state.clone());

        for event in reduction.events {
            debug!(?event, "Workflow event");
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        for effect in reduction.effects {
            self.run_effect(effect);
        }
        self.state.clone()
    }

    fn run_effect(&mut self, effect: Effect) {
        self.prune_finished();
        match effect {
            Effect::FetchEhrClaims { run_id } => {
                let Some(commands) = self.commands.upgrade() else {
                    return;
                };
                let handle = tokio::spawn(fetch_after_delay(
                    self.ehr.clone(),
                    commands,
                    run_id,
                    self.schedule,
                ));
                self.fetches.push(handle);
            }
            Effect::SchedulePhases { claim_ids } => {
                let Some(commands) = self.commands.upgrade() else {
                    return;
                };
                for claim_id in claim_ids {
                    let handles: Vec<_> = SyncPhase::ALL
                        .into_iter()
                        .map(|phase| {
                            let delay = self.schedule.phase_delay(phase);
                            let event = RuntimeEvent::SyncPhaseDue { claim_id, phase };
                            tokio::spawn(send_after(commands.clone(), delay, event))
                        })
                        .collect();
                    self.scheduled.entry(claim_id).or_default().extend(handles);
                }
            }
            Effect::CancelPhases { claim_id } => {
                if let Some(handles) = self.scheduled.remove(&claim_id) {
                    debug!(claim_id = %claim_id, pending = handles.len(), "Cancelling sync phases");
                    handles.iter().for_each(JoinHandle::abort);
                }
            }
        }
    }

    fn prune_finished(&mut self) {
        self.fetches.retain(|h| !h.is_finished());
        self.scheduled.retain(|_, handles| {
            handles.retain(|h| !h.is_finished());
            !handles.is_empty()
        });
    }

    fn abort_all(&mut self) {
        for handle in self.fetches.drain(..) {
            handle.abort();
        }
        for (_, handles) in self.scheduled.drain() {
            handles.iter().for_each(JoinHandle::abort);
        }
    }
}

async fn fetch_after_delay(
    ehr: Arc<dyn EhrPort>,
    commands: mpsc::UnboundedSender<Command>,
    run_id: SyncRunId,
    schedule: SyncSchedule,
) {
    tokio::time::sleep(schedule.initial_delay()).await;
    let event = match ehr.available_claims().await {
        Ok(claims) => RuntimeEvent::EhrClaimsFetched { run_id, claims },
        Err(e) => RuntimeEvent::EhrFetchFailed {
            run_id,
            reason: e.to_string(),
        },
    };
    deliver(&commands, event);
}

async fn send_after(
    commands: mpsc::UnboundedSender<Command>,
    delay: Duration,
    event: RuntimeEvent,
) {
    tokio::time::sleep(delay).await;
    deliver(&commands, event);
}

fn deliver(commands: &mpsc::UnboundedSender<Command>, event: RuntimeEvent) {
    let command = Command::Dispatch {
        action: Action::Runtime(event),
        reply: None,
    };
    if commands.send(command).is_err() {
        warn!("Workflow store stopped before scheduled work fired");
    }
}

//! Claims workflow simulator
//!
//! Starts a workflow store on the demo data, approves the open suggestions
//! on one claim, then runs an EHR sync and follows the synced claims until
//! their AI review completes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin claims-sim
//!
//! # Faster schedule, verbose logs
//! CLAIMS_SYNC_TIME_UNIT_MS=100 CLAIMS_LOG_LEVEL=debug cargo run --bin claims-sim
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIMS_SYNC_TIME_UNIT_MS` - Length of one sync schedule unit (default: 1000)
//! * `CLAIMS_DEFAULT_APPROVER` - Approver recorded when none is given (default: Current User)
//! * `CLAIMS_TIMEZONE` - Timezone for approval labels (default: America/New_York)
//! * `CLAIMS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::ClaimId;
use domain_claims::status;
use workflow_store::{SeedData, WorkflowConfig, WorkflowState, WorkflowStore};

const DEMO_APPROVAL: u64 = 1003;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    let seed = SeedData::demo().context("loading demo seed")?;
    let store = WorkflowStore::builder()
        .config(config)
        .seed(seed)
        .start()
        .context("starting workflow store")?;

    report(&store.snapshot());

    let claim_id = ClaimId::new(DEMO_APPROVAL);
    let state = store.approve_suggestions(claim_id, None, None).await?;
    if let Some(claim) = state.claim(claim_id) {
        let approved_at = claim.approved_at_label(store.timezone()).unwrap_or_default();
        tracing::info!(
            claim = %claim.id,
            stage = %claim.stage,
            approved_by = claim.approved_by.as_deref().unwrap_or("-"),
            approved_at = %approved_at,
            "Approved demo claim"
        );
    }

    let known = store.snapshot().claim_ids();
    store.sync_from_ehr().await?;

    let mut snapshots = store.subscribe();
    tokio::select! {
        result = wait_for_review(&mut snapshots, &known) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    report(&store.snapshot());
    store.shutdown().await?;
    Ok(())
}

fn load_config() -> WorkflowConfig {
    WorkflowConfig::load().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid CLAIMS_* configuration: {e}");
        WorkflowConfig::default()
    })
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits until every synced claim has finished AI review
async fn wait_for_review(
    snapshots: &mut watch::Receiver<std::sync::Arc<WorkflowState>>,
    known: &[ClaimId],
) -> anyhow::Result<()> {
    loop {
        let done = {
            let state = snapshots.borrow_and_update();
            let synced: Vec<_> = state.claims.iter().filter(|c| !known.contains(&c.id)).collect();
            !state.is_syncing()
                && synced.iter().all(|c| c.status == status::REVIEW_COMPLETE)
        };
        if done {
            return Ok(());
        }
        snapshots.changed().await.context("store stopped during sync")?;
    }
}

fn report(state: &WorkflowState) {
    for info in &state.stages {
        let count = state.claims_in_stage(info.stage).count();
        let total = state
            .billed_total(info.stage)
            .map(|m| m.to_string())
            .unwrap_or_else(|e| e.to_string());
        tracing::info!(stage = %info.label, count, total = %total, "Stage summary");
    }
}

//! Store errors

use core_kernel::TemporalError;
use domain_claims::ClaimError;
use thiserror::Error;

/// Errors surfaced by the store runtime
///
/// Intents never fail: stale ids and settled targets are absorbed by the
/// reducer. These errors only cover start-up and a stopped actor.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Workflow store is not running")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid timezone: {0}")]
    Timezone(#[from] TemporalError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Errors loading static seed data
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to parse {which} seed: {source}")]
    Parse {
        which: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid seed claim: {0}")]
    InvalidClaim(#[from] ClaimError),
}

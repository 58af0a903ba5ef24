//! Store configuration

use serde::Deserialize;
use std::time::Duration;

use core_kernel::{TemporalError, Timezone};
use crate::error::StoreError;
use crate::sync::SyncSchedule;

/// Workflow configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Wall-clock length of one sync schedule unit in milliseconds
    pub sync_time_unit_ms: u64,
    /// Units between a sync request and the arrival of EHR claims
    pub sync_initial_delay_units: u32,
    /// Units after arrival until a claim is queued for AI review
    pub queued_after_units: u32,
    /// Units after arrival until AI review starts
    pub analyzing_after_units: u32,
    /// Units after arrival until AI review completes
    pub review_complete_after_units: u32,
    /// Approver recorded when an approval names nobody
    pub default_approver: String,
    /// IANA timezone for approval time labels
    pub timezone: String,
    /// Log level
    pub log_level: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            sync_time_unit_ms: 1000,
            sync_initial_delay_units: 7,
            queued_after_units: 2,
            analyzing_after_units: 4,
            review_complete_after_units: 14,
            default_approver: "Current User".to_string(),
            timezone: "America/New_York".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Loads configuration from `CLAIMS_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CLAIMS").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Loads and checks configuration from the environment
    ///
    /// Malformed values surface as [`StoreError::Config`] and an unknown
    /// timezone as [`StoreError::Timezone`].
    pub fn load() -> Result<Self, StoreError> {
        let config = Self::from_env()?;
        config.timezone()?;
        Ok(config)
    }

    /// Sync timing derived from the configured units
    pub fn schedule(&self) -> SyncSchedule {
        SyncSchedule {
            unit: Duration::from_millis(self.sync_time_unit_ms),
            initial_delay_units: self.sync_initial_delay_units,
            queued_after_units: self.queued_after_units,
            analyzing_after_units: self.analyzing_after_units,
            review_complete_after_units: self.review_complete_after_units,
        }
    }

    /// Parsed display timezone
    pub fn timezone(&self) -> Result<Timezone, TemporalError> {
        self.timezone.parse()
    }
}

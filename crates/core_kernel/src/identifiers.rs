//! Strongly-typed identifiers for workflow entities
//!
//! Claims and tasks are keyed by integers assigned by the upstream record
//! system. Newtype wrappers keep a claim id from being passed where a task id
//! is expected. Sync runs get a time-ordered UUID for log correlation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! define_numeric_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from its raw value
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw value
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                raw.parse::<u64>().map(Self).map_err(|_| {
                    CoreError::validation(format!("invalid {} identifier: {}", $prefix, s))
                })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

define_numeric_id!(ClaimId, "CLM");
define_numeric_id!(TaskId, "TSK");

/// Identifier of one EHR sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncRunId(Uuid);

impl SyncRunId {
    /// Creates a new time-ordered identifier (v7)
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SyncRunId {
    fn default() -> Self {
        Self::new_v7()
    }
}

impl fmt::Display for SyncRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SYNC-{}", self.0)
    }
}

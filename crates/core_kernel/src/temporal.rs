//! Time handling for the claim workflow
//!
//! This module provides:
//! - An injectable [`Clock`] so approval stamps can be pinned in tests
//! - A serde-friendly [`Timezone`] wrapper for localized labels
//! - Label helpers for wall-clock times and task waiting durations

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Moves the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Timezone wrapper for localized display
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Renders an instant as `h:mm AM/PM` in the given timezone
pub fn clock_time_label(instant: DateTime<Utc>, tz: Timezone) -> String {
    tz.to_local(instant).format("%-I:%M %p").to_string()
}

/// Renders a waiting duration the way task lists show it
///
/// `0` is "Just now", under an hour is minutes only, under a day is hours
/// and minutes, and anything longer is days and hours.
pub fn waiting_label(minutes: u32) -> String {
    const HOUR: u32 = 60;
    const DAY: u32 = 24 * HOUR;

    match minutes {
        0 => "Just now".to_string(),
        m if m < HOUR => format!("{}m", m),
        m if m < DAY => {
            let (h, rem) = (m / HOUR, m % HOUR);
            if rem == 0 {
                format!("{}h", h)
            } else {
                format!("{}h {}m", h, rem)
            }
        }
        m => {
            let (d, h) = (m / DAY, (m % DAY) / HOUR);
            if h == 0 {
                format!("{}d", d)
            } else {
                format!("{}d {}h", d, h)
            }
        }
    }
}

use std::ops::Range;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// 2001-01-01T00:00:00Z
pub const MIN_EPOCH_SECONDS: u64 = 978_307_200;
/// 2100-01-01T00:00:00Z
pub const MAX_EPOCH_SECONDS: u64 = 4_102_444_800;

/// Inclusive range check against [`MIN_EPOCH_SECONDS`, `MAX_EPOCH_SECONDS`].
pub fn is_plausible_epoch(seconds: u64) -> bool {
    (MIN_EPOCH_SECONDS..=MAX_EPOCH_SECONDS).contains(&seconds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpochUnit {
    Seconds,
    Milliseconds,
}

impl EpochUnit {
    /// Picks the unit from the canonical decimal length of a parsed value.
    pub fn from_canonical_len(len: usize) -> Option<Self> {
        match len {
            10 => Some(EpochUnit::Seconds),
            13 => Some(EpochUnit::Milliseconds),
            _ => None,
        }
    }

    pub fn to_seconds(&self, value: u64) -> u64 {
        match self {
            EpochUnit::Seconds => value,
            EpochUnit::Milliseconds => value / 1000,
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            EpochUnit::Seconds => "seconds",
            EpochUnit::Milliseconds => "milliseconds",
        }
    }
}

/// A timestamp found in free-form text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The digits exactly as they appeared in the input.
    pub digits: String,
    /// Byte range of `digits` within the input.
    pub span: Range<usize>,
    pub value: u64,
    pub unit: EpochUnit,
    pub seconds: u64,
    pub instant: DateTime<Utc>,
}

impl Extraction {
    pub fn to_iso8601(&self) -> String {
        self.instant
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace(".000Z", "Z")
    }
}

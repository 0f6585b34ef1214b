// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-type statistics aggregates over a user's health records.
//!
//! Always reconstructible from the records themselves; the cached copy at
//! `health:<user_id>:stats:<type>` is only a shortcut.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{HealthRecord, RecordType};

/// Aggregate for one (user, type) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthStats {
    pub user_id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub count: u64,
    /// Unrounded arithmetic mean
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Latest `recorded_at` among contributing records
    pub last_record: Option<DateTime<Utc>>,
}

impl HealthStats {
    /// Zero-valued stats for a pair with no matching records.
    pub fn empty(user_id: &str, record_type: RecordType) -> Self {
        Self {
            user_id: user_id.to_string(),
            record_type,
            count: 0,
            average: 0.0,
            min: 0.0,
            max: 0.0,
            last_record: None,
        }
    }

    /// Fold every record of `record_type` into a single aggregate.
    ///
    /// Records of other types are skipped. Ties on min/max keep the first
    /// value seen.
    pub fn aggregate<'a, I>(user_id: &str, record_type: RecordType, records: I) -> Self
    where
        I: IntoIterator<Item = &'a HealthRecord>,
    {
        let mut stats = Self::empty(user_id, record_type);
        let mut sum = 0.0;

        for record in records
            .into_iter()
            .filter(|r| r.record_type == record_type)
        {
            if stats.count == 0 {
                stats.min = record.value;
                stats.max = record.value;
            } else {
                if record.value < stats.min {
                    stats.min = record.value;
                }
                if record.value > stats.max {
                    stats.max = record.value;
                }
            }
            match stats.last_record {
                Some(last) if last >= record.recorded_at => {}
                _ => stats.last_record = Some(record.recorded_at),
            }
            sum += record.value;
            stats.count += 1;
        }

        if stats.count > 0 {
            stats.average = sum / stats.count as f64;
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health measurement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The closed set of measurement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RecordType {
    BloodPressure,
    HeartRate,
    Weight,
    Temperature,
    Glucose,
}

impl RecordType {
    pub const ALL: [RecordType; 5] = [
        RecordType::BloodPressure,
        RecordType::HeartRate,
        RecordType::Weight,
        RecordType::Temperature,
        RecordType::Glucose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::BloodPressure => "blood_pressure",
            RecordType::HeartRate => "heart_rate",
            RecordType::Weight => "weight",
            RecordType::Temperature => "temperature",
            RecordType::Glucose => "glucose",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown record type: {0}")]
pub struct UnknownRecordType(pub String);

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownRecordType(s.to_string()))
    }
}

/// A single measurement, stored under `health:<user_id>:<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: f64,
    /// Free-form unit ("mmHg", "bpm", "kg", "°C", "mg/dL")
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the measurement was taken (client supplied, else creation time)
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_round_trips_through_str() {
        for t in RecordType::ALL {
            assert_eq!(t.as_str().parse::<RecordType>().unwrap(), t);
            assert_eq!(
                serde_json::to_value(t).unwrap(),
                serde_json::Value::String(t.to_string())
            );
        }
    }

    #[test]
    fn test_record_type_rejects_unknown() {
        assert!("steps".parse::<RecordType>().is_err());
        assert!("HeartRate".parse::<RecordType>().is_err());
        assert!(serde_json::from_str::<RecordType>("\"steps\"").is_err());
    }

    #[test]
    fn test_record_serializes_type_field() {
        let now = Utc::now();
        let record = HealthRecord {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            record_type: RecordType::HeartRate,
            value: 72.0,
            unit: "bpm".to_string(),
            notes: None,
            recorded_at: now,
            created_at: now,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "heart_rate");
        assert!(json.get("notes").is_none());
    }
}

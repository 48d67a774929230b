// src/models/readings.rs
//
// A reading's timestamp is persisted in one of two forms: a structured
// `recorded_at` instant or a numeric `recorded_epoch` (seconds since the Unix
// epoch). The two nullable columns are the storage-boundary tagged union;
// `normalize` collapses them so the numeric form never leaves the store layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: String,
    pub machine_id: String,
    pub bearing_id: String,
    #[serde(rename = "timestamp")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing, default)]
    pub recorded_epoch: Option<f64>,
    pub status: String,
    #[serde(rename = "Axis_Id")]
    pub axis_id: String,
    pub acceleration: Option<serde_json::Value>,
    pub velocity: Option<serde_json::Value>,
    pub temperature: Option<f64>,
    pub fft_data: Option<serde_json::Value>,
    pub analytics_type: Option<String>,
    #[serde(skip_serializing)]
    pub raw_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Reading {
    /// Resolves the timestamp regardless of which representation was stored.
    /// Epoch values are converted at 1-second resolution.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.recorded_at.or_else(|| {
            self.recorded_epoch
                .and_then(|epoch| DateTime::from_timestamp(epoch as i64, 0))
        })
    }

    /// Collapses the dual representation into the structured instant form and
    /// clears the numeric field.
    pub fn normalize(mut self) -> Self {
        self.recorded_at = self.timestamp();
        self.recorded_epoch = None;
        self
    }
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::readings)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub id: String,
    pub machine_id: String,
    pub bearing_id: String,
    #[serde(rename = "timestamp")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recorded_epoch: Option<f64>,
    pub status: String,
    #[serde(rename = "Axis_Id")]
    pub axis_id: String,
    pub acceleration: Option<serde_json::Value>,
    pub velocity: Option<serde_json::Value>,
    pub temperature: Option<f64>,
    pub fft_data: Option<serde_json::Value>,
    pub analytics_type: Option<String>,
    pub raw_data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank_reading() -> Reading {
        Reading {
            id: "reading_001".to_string(),
            machine_id: "machine_001".to_string(),
            bearing_id: "bearing_001".to_string(),
            recorded_at: None,
            recorded_epoch: None,
            status: "Normal".to_string(),
            axis_id: "A-Axis".to_string(),
            acceleration: None,
            velocity: None,
            temperature: None,
            fft_data: None,
            analytics_type: None,
            raw_data: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_timestamp_prefers_structured_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        let mut reading = blank_reading();
        reading.recorded_at = Some(instant);
        reading.recorded_epoch = Some(0.0);

        assert_eq!(reading.timestamp(), Some(instant));
    }

    #[test]
    fn test_timestamp_converts_epoch_seconds() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        let mut reading = blank_reading();
        reading.recorded_epoch = Some(instant.timestamp() as f64);

        assert_eq!(reading.timestamp(), Some(instant));
    }

    #[test]
    fn test_normalize_clears_numeric_form() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        let mut reading = blank_reading();
        reading.recorded_epoch = Some(instant.timestamp() as f64);

        let normalized = reading.normalize();
        assert_eq!(normalized.recorded_at, Some(instant));
        assert!(normalized.recorded_epoch.is_none());
    }

    #[test]
    fn test_serialized_reading_exposes_single_timestamp() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        let mut reading = blank_reading();
        reading.recorded_epoch = Some(instant.timestamp() as f64);

        let json = serde_json::to_value(reading.normalize()).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("recordedEpoch").is_none());
        assert_eq!(json["Axis_Id"], "A-Axis");
    }
}

// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four health classifications, in severity order.
pub const STATUSES: [&str; 4] = ["Normal", "Satisfactory", "Alert", "Unacceptable"];

/// Per-status reading counts. All four keys are always present; unknown
/// statuses are ignored rather than counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "Normal")]
    pub normal: i64,
    #[serde(rename = "Satisfactory")]
    pub satisfactory: i64,
    #[serde(rename = "Alert")]
    pub alert: i64,
    #[serde(rename = "Unacceptable")]
    pub unacceptable: i64,
}

impl StatusCounts {
    pub fn record(&mut self, status: &str) {
        match status {
            "Normal" => self.normal += 1,
            "Satisfactory" => self.satisfactory += 1,
            "Alert" => self.alert += 1,
            "Unacceptable" => self.unacceptable += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> i64 {
        self.normal + self.satisfactory + self.alert + self.unacceptable
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KpiStats {
    pub total_readings: i64,
    pub status_counts: StatusCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyTrend {
    pub hour: u32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTrend {
    pub date: String,
    pub status_counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub machines_count: i64,
    pub bearings_count: i64,
    pub data_records_count: i64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_record() {
        let mut counts = StatusCounts::default();
        counts.record("Normal");
        counts.record("Normal");
        counts.record("Alert");
        counts.record("something else");

        assert_eq!(counts.normal, 2);
        assert_eq!(counts.alert, 1);
        assert_eq!(counts.satisfactory, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_status_counts_serializes_all_four_keys() {
        let json = serde_json::to_value(StatusCounts::default()).unwrap();
        for status in STATUSES {
            assert_eq!(json[status], 0, "missing status key {}", status);
        }
    }
}

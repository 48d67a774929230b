//! # Feed Communication Module
//!
//! Handles all communication with the upstream sensor feed API.
//!
//! The feed exposes three endpoints:
//! - `POST /Machine` with `{"date": "YYYY-MM-DD"}` returns the machines
//!   registered for that date
//! - `GET /Bearing?machineId=<id>` returns the bearings of a machine
//! - `POST /Data` returns the current reading for one bearing, or an empty
//!   body when the bearing has nothing to report
//!
//! Empty and `null` response bodies are normal feed behavior, not errors.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::IngestionError;

/// Machine record as delivered by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedMachine {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "machineName")]
    pub machine_name: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub subarea: Option<String>,
    #[serde(rename = "machineType", default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Bearing record as delivered by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedBearing {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "machineId")]
    pub machine_id: String,
    #[serde(rename = "bearingLocation", default)]
    pub bearing_location: Option<String>,
    #[serde(rename = "bearingType", default)]
    pub bearing_type: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Sensor reading as delivered by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedReading {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub acceleration: Option<serde_json::Value>,
    #[serde(default)]
    pub velocity: Option<serde_json::Value>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(rename = "fftData", default)]
    pub fft_data: Option<serde_json::Value>,
    #[serde(rename = "analyticsType", default)]
    pub analytics_type: Option<String>,
    #[serde(rename = "rawData", default)]
    pub raw_data: Option<serde_json::Value>,
}

/// The upstream feed capability. The pipeline only depends on this trait, so
/// tests can drive it with a stub instead of a live endpoint.
pub trait Feed: Send + Sync {
    fn fetch_machines(
        &self,
        date: &str,
    ) -> impl Future<Output = Result<Vec<FeedMachine>, IngestionError>> + Send;

    fn fetch_bearings(
        &self,
        machine_id: &str,
    ) -> impl Future<Output = Result<Vec<FeedBearing>, IngestionError>> + Send;

    /// Current reading for one bearing. `None` means the bearing has nothing
    /// to report right now.
    fn fetch_reading(
        &self,
        machine_id: &str,
        bearing_id: &str,
        machine_type: &str,
        axis: &str,
        analytics: &str,
    ) -> impl Future<Output = Result<Option<FeedReading>, IngestionError>> + Send;
}

/// HTTP client for the live feed.
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, IngestionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(FeedClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Decodes a body that may legitimately be empty or `null`.
    fn decode_list<T: serde::de::DeserializeOwned>(body: &str) -> Result<Vec<T>, IngestionError> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

impl Feed for FeedClient {
    async fn fetch_machines(&self, date: &str) -> Result<Vec<FeedMachine>, IngestionError> {
        let url = format!("{}/Machine", self.base_url);
        let body = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "date": date }))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::decode_list(&body)
    }

    async fn fetch_bearings(&self, machine_id: &str) -> Result<Vec<FeedBearing>, IngestionError> {
        let url = format!("{}/Bearing", self.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[("machineId", machine_id)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::decode_list(&body)
    }

    async fn fetch_reading(
        &self,
        machine_id: &str,
        bearing_id: &str,
        machine_type: &str,
        axis: &str,
        analytics: &str,
    ) -> Result<Option<FeedReading>, IngestionError> {
        let url = format!("{}/Data", self.base_url);
        let body = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "machineId": machine_id,
                "bearingLocationId": bearing_id,
                "type": machine_type,
                "Axis_Id": axis,
                "Analytics_Types": analytics,
            }))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(trimmed)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list_treats_empty_and_null_as_no_records() {
        let empty: Vec<FeedMachine> = FeedClient::decode_list("").unwrap();
        assert!(empty.is_empty());
        let null: Vec<FeedMachine> = FeedClient::decode_list("null").unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn test_feed_machine_field_names() {
        let machine: FeedMachine = serde_json::from_str(
            r#"{"_id": "machine_001", "machineName": "Pump A1", "machineType": "PUMP"}"#,
        )
        .unwrap();
        assert_eq!(machine.id, "machine_001");
        assert_eq!(machine.machine_name, "Pump A1");
        assert_eq!(machine.machine_type.as_deref(), Some("PUMP"));
        assert!(machine.customer.is_none());
    }

    #[test]
    fn test_feed_reading_is_mostly_optional() {
        let reading: FeedReading = serde_json::from_str(r#"{"temperature": 61.2}"#).unwrap();
        assert_eq!(reading.temperature, Some(61.2));
        assert!(reading.id.is_none());
        assert!(reading.fft_data.is_none());
    }
}

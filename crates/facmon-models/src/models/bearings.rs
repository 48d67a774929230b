// src/models/bearings.rs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::machines::STATUS_NORMAL;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::bearings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Bearing {
    pub id: String,
    pub machine_id: String,
    pub bearing_location: String,
    pub bearing_type: Option<String>,
    pub position: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::bearings)]
#[serde(rename_all = "camelCase")]
pub struct NewBearing {
    pub id: String,
    pub machine_id: String,
    pub bearing_location: String,
    pub bearing_type: Option<String>,
    pub position: Option<String>,
    pub status: String,
}

impl NewBearing {
    pub fn new(
        id: String,
        machine_id: String,
        bearing_location: String,
        bearing_type: Option<String>,
        position: Option<String>,
        status: Option<String>,
    ) -> Result<Self, String> {
        if id.trim().is_empty() {
            return Err("Bearing id cannot be empty".to_string());
        }
        if machine_id.trim().is_empty() {
            return Err("Bearing machine id cannot be empty".to_string());
        }

        Ok(NewBearing {
            id,
            machine_id,
            bearing_location,
            bearing_type,
            position,
            status: status.unwrap_or_else(|| STATUS_NORMAL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bearing_success() {
        let bearing = NewBearing::new(
            "bearing_001".to_string(),
            "machine_001".to_string(),
            "Drive End".to_string(),
            Some("Roller".to_string()),
            Some("DE".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(bearing.machine_id, "machine_001");
        assert_eq!(bearing.status, STATUS_NORMAL);
    }

    #[test]
    fn test_new_bearing_empty_machine_id() {
        let result = NewBearing::new(
            "bearing_001".to_string(),
            "".to_string(),
            "Drive End".to_string(),
            None,
            None,
            None,
        );
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "Bearing machine id cannot be empty");
    }
}

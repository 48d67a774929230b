// src/models/machines.rs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Default health classification for machines and readings.
pub const STATUS_NORMAL: &str = "Normal";

#[derive(Queryable, Selectable, Identifiable, AsChangeset, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::machines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    pub machine_name: String,
    pub customer: String,
    pub area: String,
    pub subarea: String,
    pub machine_type: Option<String>,
    pub status: String,
    pub ingested_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Machine {
    /// Builds a synthetic machine for an id that is referenced by bearings or
    /// readings but has no catalog record of its own.
    pub fn placeholder(machine_id: &str) -> Self {
        let now = Utc::now();
        Machine {
            id: machine_id.to_string(),
            machine_name: machine_id.to_string(),
            customer: "Unknown".to_string(),
            area: "Unknown".to_string(),
            subarea: "Unknown".to_string(),
            machine_type: None,
            status: STATUS_NORMAL.to_string(),
            ingested_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::machines)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct NewMachine {
    pub id: String,
    pub machine_name: String,
    pub customer: String,
    pub area: String,
    pub subarea: String,
    pub machine_type: Option<String>,
    pub status: String,
    pub ingested_date: Option<String>,
}

impl NewMachine {
    pub fn new(
        id: String,
        machine_name: String,
        customer: String,
        area: String,
        subarea: String,
        machine_type: Option<String>,
        status: Option<String>,
        ingested_date: Option<String>,
    ) -> Result<Self, String> {
        if id.trim().is_empty() {
            return Err("Machine id cannot be empty".to_string());
        }
        if machine_name.trim().is_empty() {
            return Err("Machine name cannot be empty".to_string());
        }

        Ok(NewMachine {
            id,
            machine_name,
            customer,
            area,
            subarea,
            machine_type,
            status: status.unwrap_or_else(|| STATUS_NORMAL.to_string()),
            ingested_date,
        })
    }
}

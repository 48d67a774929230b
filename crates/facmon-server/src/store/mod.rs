/*
 * Copyright (c) 2025 Facmon Contributors
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Storage capability shared by the API handlers and the ingestion pipeline.
//!
//! `Store` is the seam between request handling and persistence: the live
//! implementation runs diesel queries against Postgres, the fixture
//! implementation serves from memory for demos and tests. Handlers never see
//! a raw connection pool, only this trait.

pub mod aggregate;
pub mod fixture;

use std::sync::Arc;

use facmon_models::filters::{DateRange, MachineFilter, ReadingFilter};
use facmon_models::models::{
    Bearing, HourlyTrend, KpiStats, Machine, NewBearing, NewMachine, NewReading, Reading,
    StatusTrend, SystemStats,
};

pub use fixture::FixtureStore;

/// Errors surfaced by a store. `Unavailable` means the backing service could
/// not be reached at all; `Query` means it rejected or failed the operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] r2d2::Error),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

pub type SharedStore = Arc<dyn Store>;

pub trait Store: Send + Sync {
    // Machine catalog
    fn list_machines(&self, filter: &MachineFilter) -> Result<Vec<Machine>, StoreError>;
    fn get_machine(&self, id: &str) -> Result<Option<Machine>, StoreError>;
    /// Inserts or replaces a machine record. Returns true if a row was written.
    fn upsert_machine(&self, machine: &NewMachine) -> Result<bool, StoreError>;
    fn machines_ingested_on(&self, date: &str) -> Result<Vec<Machine>, StoreError>;

    // Bearing registry
    fn bearings_for_machine(&self, machine_id: &str) -> Result<Vec<Bearing>, StoreError>;
    fn has_bearings(&self, machine_id: &str) -> Result<bool, StoreError>;
    fn insert_bearings(&self, bearings: &[NewBearing]) -> Result<usize, StoreError>;
    fn all_bearings(&self) -> Result<Vec<Bearing>, StoreError>;

    // Readings
    fn query_readings(&self, filter: &ReadingFilter, limit: i64) -> Result<Vec<Reading>, StoreError>;
    /// Latest reading per bearing for a machine, newest first within the set.
    fn latest_readings(&self, machine_id: &str) -> Result<Vec<Reading>, StoreError>;
    fn get_reading(&self, id: &str) -> Result<Option<Reading>, StoreError>;
    fn insert_reading(&self, reading: &NewReading) -> Result<(), StoreError>;

    // Dashboard aggregation
    fn kpi_stats(&self, range: &DateRange, dual_timestamps: bool) -> Result<KpiStats, StoreError>;
    fn hourly_trend(&self, range: &DateRange) -> Result<Vec<HourlyTrend>, StoreError>;
    fn status_trend(
        &self,
        range: &DateRange,
        customer: Option<&str>,
    ) -> Result<Vec<StatusTrend>, StoreError>;
    fn system_stats(&self) -> Result<SystemStats, StoreError>;
}

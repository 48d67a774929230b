use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

mod bearings;
mod dashboard;
mod machines;
mod readings;

pub use bearings::BearingsDAL;
pub use dashboard::DashboardDAL;
pub use machines::MachinesDAL;
pub use readings::ReadingsDAL;

use facmon_models::filters::{DateRange, MachineFilter, ReadingFilter};
use facmon_models::models::{
    Bearing, HourlyTrend, KpiStats, Machine, NewBearing, NewMachine, NewReading, Reading,
    StatusTrend, SystemStats,
};

use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct DAL {
    pub pool: Pool<ConnectionManager<PgConnection>>,
}

impl DAL {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        DAL { pool }
    }

    pub fn machines(&self) -> MachinesDAL {
        MachinesDAL { dal: self }
    }

    pub fn bearings(&self) -> BearingsDAL {
        BearingsDAL { dal: self }
    }

    pub fn readings(&self) -> ReadingsDAL {
        ReadingsDAL { dal: self }
    }

    pub fn dashboard(&self) -> DashboardDAL {
        DashboardDAL { dal: self }
    }
}

impl Store for DAL {
    fn list_machines(&self, filter: &MachineFilter) -> Result<Vec<Machine>, StoreError> {
        self.machines().list(filter)
    }

    fn get_machine(&self, id: &str) -> Result<Option<Machine>, StoreError> {
        self.machines().get(id)
    }

    fn upsert_machine(&self, machine: &NewMachine) -> Result<bool, StoreError> {
        self.machines().upsert(machine)
    }

    fn machines_ingested_on(&self, date: &str) -> Result<Vec<Machine>, StoreError> {
        self.machines().ingested_on(date)
    }

    fn bearings_for_machine(&self, machine_id: &str) -> Result<Vec<Bearing>, StoreError> {
        self.bearings().for_machine(machine_id)
    }

    fn has_bearings(&self, machine_id: &str) -> Result<bool, StoreError> {
        self.bearings().exists_for_machine(machine_id)
    }

    fn insert_bearings(&self, bearings: &[NewBearing]) -> Result<usize, StoreError> {
        self.bearings().insert_many(bearings)
    }

    fn all_bearings(&self) -> Result<Vec<Bearing>, StoreError> {
        self.bearings().list_all()
    }

    fn query_readings(&self, filter: &ReadingFilter, limit: i64) -> Result<Vec<Reading>, StoreError> {
        self.readings().query(filter, limit)
    }

    fn latest_readings(&self, machine_id: &str) -> Result<Vec<Reading>, StoreError> {
        self.readings().latest_per_bearing(machine_id)
    }

    fn get_reading(&self, id: &str) -> Result<Option<Reading>, StoreError> {
        self.readings().get(id)
    }

    fn insert_reading(&self, reading: &NewReading) -> Result<(), StoreError> {
        self.readings().insert(reading)
    }

    fn kpi_stats(&self, range: &DateRange, dual_timestamps: bool) -> Result<KpiStats, StoreError> {
        self.dashboard().kpi_stats(range, dual_timestamps)
    }

    fn hourly_trend(&self, range: &DateRange) -> Result<Vec<HourlyTrend>, StoreError> {
        self.dashboard().hourly_trend(range)
    }

    fn status_trend(
        &self,
        range: &DateRange,
        customer: Option<&str>,
    ) -> Result<Vec<StatusTrend>, StoreError> {
        self.dashboard().status_trend(range, customer)
    }

    fn system_stats(&self) -> Result<SystemStats, StoreError> {
        self.dashboard().system_stats()
    }
}

use diesel::dsl::exists;
use diesel::prelude::*;

use facmon_models::models::{Bearing, NewBearing};
use facmon_models::schema::bearings;

use crate::dal::DAL;
use crate::store::StoreError;

/// Data Access Layer for bearing registry operations.
pub struct BearingsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl<'a> BearingsDAL<'a> {
    /// Bearings registered for a machine.
    pub fn for_machine(&self, machine_id: &str) -> Result<Vec<Bearing>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(bearings::table
            .filter(bearings::machine_id.eq(machine_id))
            .order(bearings::id.asc())
            .load(conn)?)
    }

    /// Whether any bearing is registered for a machine.
    pub fn exists_for_machine(&self, machine_id: &str) -> Result<bool, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::select(exists(
            bearings::table.filter(bearings::machine_id.eq(machine_id)),
        ))
        .get_result(conn)?)
    }

    /// Inserts a batch of bearings. Returns the number of rows written.
    pub fn insert_many(&self, new_bearings: &[NewBearing]) -> Result<usize, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(bearings::table)
            .values(new_bearings)
            .execute(conn)?)
    }

    /// All bearings in the registry.
    pub fn list_all(&self) -> Result<Vec<Bearing>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(bearings::table.order(bearings::id.asc()).load(conn)?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(bearings::table.count().get_result(conn)?)
    }
}

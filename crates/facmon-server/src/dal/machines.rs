use diesel::prelude::*;
use diesel::PgConnection;

use facmon_models::filters::MachineFilter;
use facmon_models::models::{Machine, NewMachine};
use facmon_models::schema::{bearings, machines};
use facmon_utils::logging::prelude::*;

use crate::dal::DAL;
use crate::store::StoreError;

/// Data Access Layer for machine catalog operations.
pub struct MachinesDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl<'a> MachinesDAL<'a> {
    /// Lists machines matching the filter. When the catalog query yields
    /// nothing, placeholder machines are derived from the distinct machine
    /// ids in the bearing registry. A failure during that fallback is logged
    /// and the empty primary result stands.
    pub fn list(&self, filter: &MachineFilter) -> Result<Vec<Machine>, StoreError> {
        let conn = &mut self.dal.pool.get()?;

        let mut query = machines::table.into_boxed();
        if let Some(ref customer) = filter.customer {
            query = query.filter(machines::customer.ilike(format!("%{}%", customer)));
        }
        if let Some(ref area) = filter.area {
            query = query.filter(machines::area.ilike(format!("%{}%", area)));
        }
        if let Some(ref subarea) = filter.subarea {
            query = query.filter(machines::subarea.ilike(format!("%{}%", subarea)));
        }
        if let Some(ref name) = filter.machine_name {
            query = query.filter(machines::machine_name.ilike(format!("%{}%", name)));
        }
        if let Some(ref status) = filter.status {
            query = query.filter(machines::status.eq(status.clone()));
        }
        if let Some(ref after) = filter.ingested_after {
            query = query.filter(machines::ingested_date.ge(after.clone()));
        }
        if let Some(ref before) = filter.ingested_before {
            query = query.filter(machines::ingested_date.le(before.clone()));
        }

        let primary = query.order(machines::id.asc()).load::<Machine>(conn)?;
        if !primary.is_empty() {
            return Ok(primary);
        }

        match self.synthesize_from_bearings(conn) {
            Ok(synthesized) => Ok(synthesized),
            Err(e) => {
                warn!("Catalog fallback from bearing registry failed: {:?}", e);
                Ok(primary)
            }
        }
    }

    fn synthesize_from_bearings(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Vec<Machine>, diesel::result::Error> {
        let machine_ids: Vec<String> = bearings::table
            .select(bearings::machine_id)
            .distinct()
            .order(bearings::machine_id.asc())
            .load(conn)?;
        Ok(machine_ids
            .iter()
            .map(|id| Machine::placeholder(id))
            .collect())
    }

    /// Retrieves a machine by its id.
    pub fn get(&self, id: &str) -> Result<Option<Machine>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(machines::table
            .filter(machines::id.eq(id))
            .first(conn)
            .optional()?)
    }

    /// Inserts a machine or fully replaces the existing record with the same
    /// id. Returns true if a row was written.
    pub fn upsert(&self, machine: &NewMachine) -> Result<bool, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        let written = diesel::insert_into(machines::table)
            .values(machine)
            .on_conflict(machines::id)
            .do_update()
            .set((machine, machines::updated_at.eq(diesel::dsl::now)))
            .execute(conn)?;
        Ok(written > 0)
    }

    /// Machines stamped with the given ingestion date.
    pub fn ingested_on(&self, date: &str) -> Result<Vec<Machine>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(machines::table
            .filter(machines::ingested_date.eq(date))
            .order(machines::id.asc())
            .load(conn)?)
    }
}

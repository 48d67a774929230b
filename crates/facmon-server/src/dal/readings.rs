use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Timestamptz};

use facmon_models::filters::ReadingFilter;
use facmon_models::models::{NewReading, Reading};
use facmon_models::schema::readings;

use crate::dal::DAL;
use crate::store::StoreError;

// Resolves the stored timestamp regardless of which column carries it.
// Mirrors Reading::timestamp() on the SQL side so ordering and the Rust-side
// view agree.
const RECORDED: &str = "COALESCE(recorded_at, to_timestamp(recorded_epoch))";

/// Data Access Layer for reading store operations.
pub struct ReadingsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl<'a> ReadingsDAL<'a> {
    /// Queries readings matching the filter, newest first, up to `limit`
    /// rows. A date bound matches a row if either timestamp representation
    /// falls inside it. Rows are normalized before leaving the store.
    pub fn query(&self, filter: &ReadingFilter, limit: i64) -> Result<Vec<Reading>, StoreError> {
        let conn = &mut self.dal.pool.get()?;

        let mut query = readings::table.into_boxed();
        if let Some(ref bearing_id) = filter.bearing_id {
            query = query.filter(readings::bearing_id.eq(bearing_id.clone()));
        }
        if let Some(ref machine_id) = filter.machine_id {
            query = query.filter(readings::machine_id.eq(machine_id.clone()));
        }

        let range = &filter.range;
        match (range.start, range.end) {
            (Some(start), Some(end)) => {
                let (start_e, end_e) = (start.timestamp() as f64, end.timestamp() as f64);
                query = query.filter(
                    readings::recorded_at
                        .ge(start)
                        .and(readings::recorded_at.le(end))
                        .or(readings::recorded_epoch
                            .ge(start_e)
                            .and(readings::recorded_epoch.le(end_e))),
                );
            }
            (Some(start), None) => {
                query = query.filter(
                    readings::recorded_at
                        .ge(start)
                        .or(readings::recorded_epoch.ge(start.timestamp() as f64)),
                );
            }
            (None, Some(end)) => {
                query = query.filter(
                    readings::recorded_at
                        .le(end)
                        .or(readings::recorded_epoch.le(end.timestamp() as f64)),
                );
            }
            (None, None) => {}
        }

        let rows = query
            .order(sql::<Nullable<Timestamptz>>(RECORDED).desc().nulls_last())
            .limit(limit)
            .load::<Reading>(conn)?;
        Ok(rows.into_iter().map(Reading::normalize).collect())
    }

    /// Latest reading per bearing for a machine. On equal timestamps the
    /// smallest reading id wins, so the result is deterministic.
    pub fn latest_per_bearing(&self, machine_id: &str) -> Result<Vec<Reading>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        let rows = readings::table
            .filter(readings::machine_id.eq(machine_id))
            .order((
                readings::bearing_id.asc(),
                sql::<Nullable<Timestamptz>>(RECORDED).desc().nulls_last(),
                readings::id.asc(),
            ))
            .distinct_on(readings::bearing_id)
            .load::<Reading>(conn)?;
        Ok(rows.into_iter().map(Reading::normalize).collect())
    }

    /// Retrieves a reading by its id.
    pub fn get(&self, id: &str) -> Result<Option<Reading>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        let row: Option<Reading> = readings::table
            .filter(readings::id.eq(id))
            .first(conn)
            .optional()?;
        Ok(row.map(Reading::normalize))
    }

    /// Inserts a new reading.
    pub fn insert(&self, reading: &NewReading) -> Result<(), StoreError> {
        let conn = &mut self.dal.pool.get()?;
        diesel::insert_into(readings::table)
            .values(reading)
            .execute(conn)?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(readings::table.count().get_result(conn)?)
    }
}

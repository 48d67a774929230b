use diesel::prelude::*;
use diesel::PgConnection;

use chrono::Utc;

use facmon_models::filters::{DateRange, MachineFilter};
use facmon_models::models::{HourlyTrend, KpiStats, Reading, StatusTrend, SystemStats};
use facmon_models::schema::{machines, readings};

use crate::dal::DAL;
use crate::store::{aggregate, StoreError};

/// Data Access Layer for dashboard aggregation. Matching readings are
/// fetched and folded in Rust by the shared aggregation functions.
pub struct DashboardDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

/// Which timestamp representations a date bound applies to.
#[derive(Clone, Copy)]
enum RangeMode {
    /// Either stored representation in range qualifies.
    Dual,
    /// Only structured instants qualify once a bound is set.
    InstantOnly,
}

impl<'a> DashboardDAL<'a> {
    /// KPI statistics over readings in the range. When `dual_timestamps` is
    /// false, a bounded range counts structured instants only; an unbounded
    /// range always counts every reading.
    pub fn kpi_stats(
        &self,
        range: &DateRange,
        dual_timestamps: bool,
    ) -> Result<KpiStats, StoreError> {
        let mode = if dual_timestamps {
            RangeMode::Dual
        } else {
            RangeMode::InstantOnly
        };
        let conn = &mut self.dal.pool.get()?;
        let rows = fetch_in_range(conn, range, mode, None)?;
        Ok(aggregate::kpi_stats(&rows))
    }

    /// Reading counts per hour of day over the range.
    pub fn hourly_trend(&self, range: &DateRange) -> Result<Vec<HourlyTrend>, StoreError> {
        let conn = &mut self.dal.pool.get()?;
        let rows = fetch_in_range(conn, range, RangeMode::Dual, None)?;
        Ok(aggregate::hourly_trend(&rows))
    }

    /// Per-day status tallies over the range, optionally scoped to the
    /// machines of one customer (exact match). A customer with no machines
    /// yields an empty trend.
    pub fn status_trend(
        &self,
        range: &DateRange,
        customer: Option<&str>,
    ) -> Result<Vec<StatusTrend>, StoreError> {
        let conn = &mut self.dal.pool.get()?;

        let machine_ids: Option<Vec<String>> = match customer {
            Some(customer) => Some(
                machines::table
                    .filter(machines::customer.eq(customer))
                    .select(machines::id)
                    .load(conn)?,
            ),
            None => None,
        };
        if let Some(ref ids) = machine_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
        }

        let rows = fetch_in_range(conn, range, RangeMode::Dual, machine_ids.as_deref())?;
        Ok(aggregate::status_trend(&rows))
    }

    /// Collection counts for the whole system. The machine count follows the
    /// catalog accessor, so it reflects synthesized machines when the catalog
    /// is empty.
    pub fn system_stats(&self) -> Result<SystemStats, StoreError> {
        let machines_count = self
            .dal
            .machines()
            .list(&MachineFilter::default())?
            .len() as i64;
        Ok(SystemStats {
            machines_count,
            bearings_count: self.dal.bearings().count()?,
            data_records_count: self.dal.readings().count()?,
            timestamp: Utc::now(),
        })
    }
}

fn fetch_in_range(
    conn: &mut PgConnection,
    range: &DateRange,
    mode: RangeMode,
    machine_ids: Option<&[String]>,
) -> Result<Vec<Reading>, StoreError> {
    let mut query = readings::table.into_boxed();

    if let Some(ids) = machine_ids {
        query = query.filter(readings::machine_id.eq_any(ids.to_vec()));
    }

    match mode {
        RangeMode::Dual => match (range.start, range.end) {
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
        },
        RangeMode::InstantOnly => {
            if let Some(start) = range.start {
                query = query.filter(readings::recorded_at.ge(start));
            }
            if let Some(end) = range.end {
                query = query.filter(readings::recorded_at.le(end));
            }
        }
    }

    Ok(query.load::<Reading>(conn)?)
}

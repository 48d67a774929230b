//! Three-stage ingestion pipeline: machines, then bearings, then readings.
//!
//! Error isolation is per stage and per record. A machine-stage failure
//! aborts the date (nothing downstream could be stamped); a failure for one
//! machine's bearings or one bearing's reading is counted and the run moves
//! on. The run as a whole reports how many records it wrote and how many
//! errors it absorbed.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use facmon_models::models::machines::STATUS_NORMAL;
use facmon_models::models::{Bearing, NewBearing, NewMachine, NewReading};
use facmon_server::store::SharedStore;
use facmon_utils::logging::prelude::*;

use crate::error::IngestionError;
use crate::feed::{Feed, FeedReading};

/// Machine type used for reading requests when the owning machine is unknown
/// or carries no type.
const FALLBACK_MACHINE_TYPE: &str = "OFFLINE";

/// Counters for one ingestion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub machines: usize,
    pub bearings: usize,
    pub readings: usize,
    pub errors: usize,
}

impl IngestionStats {
    pub fn merge(&mut self, other: IngestionStats) {
        self.machines += other.machines;
        self.bearings += other.bearings;
        self.readings += other.readings;
        self.errors += other.errors;
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

pub struct IngestionPipeline<F: Feed> {
    feed: F,
    store: SharedStore,
    axis: String,
    analytics: String,
}

impl<F: Feed> IngestionPipeline<F> {
    pub fn new(feed: F, store: SharedStore, axis: String, analytics: String) -> Self {
        IngestionPipeline {
            feed,
            store,
            axis,
            analytics,
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Runs the pipeline for each date in order. A date that fails outright
    /// is counted as one error and the remaining dates still run.
    pub async fn run(&self, dates: &[NaiveDate]) -> IngestionStats {
        let mut total = IngestionStats::default();
        for date in dates {
            match self.run_for_date(*date).await {
                Ok(stats) => {
                    info!(
                        "Ingestion for {}: {} machines, {} bearings, {} readings, {} errors",
                        date, stats.machines, stats.bearings, stats.readings, stats.errors
                    );
                    total.merge(stats);
                }
                Err(e) => {
                    error!("Ingestion for {} failed: {}", date, e);
                    total.errors += 1;
                }
            }
        }
        total
    }

    /// Runs the three stages for one date.
    pub async fn run_for_date(&self, date: NaiveDate) -> Result<IngestionStats, IngestionError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stats = IngestionStats::default();

        // Stage 1: machines. A feed failure here aborts the date since the
        // later stages key off what was stamped with this date.
        let feed_machines = self.feed.fetch_machines(&date_str).await?;
        for feed_machine in feed_machines {
            let machine = match NewMachine::new(
                feed_machine.id.clone(),
                feed_machine.machine_name,
                feed_machine.customer.unwrap_or_else(|| "Unknown".to_string()),
                feed_machine.area.unwrap_or_else(|| "Unknown".to_string()),
                feed_machine.subarea.unwrap_or_else(|| "Unknown".to_string()),
                feed_machine.machine_type,
                feed_machine.status,
                Some(date_str.clone()),
            ) {
                Ok(machine) => machine,
                Err(e) => {
                    warn!("Skipping invalid machine {}: {}", feed_machine.id, e);
                    stats.errors += 1;
                    continue;
                }
            };
            if self.store.upsert_machine(&machine)? {
                stats.machines += 1;
            }
        }

        // Stage 2: bearings, one machine at a time. A failure for one
        // machine is absorbed and the others proceed.
        let stamped = self.store.machines_ingested_on(&date_str)?;
        for machine in &stamped {
            match self.try_ingest_bearings(&machine.id).await {
                Ok(written) => stats.bearings += written,
                Err(e) => {
                    warn!("Bearing ingestion for {} failed: {}", machine.id, e);
                    stats.errors += 1;
                }
            }
        }

        // Stage 3: readings, over every registered bearing. One bearing's
        // failure is absorbed; a store failure listing the bearings aborts
        // since nothing further could be written anyway.
        for bearing in self.store.all_bearings()? {
            match self.try_ingest_reading(&bearing).await {
                Ok(true) => stats.readings += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Reading ingestion for bearing {} failed: {}", bearing.id, e);
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Fetches and writes the bearings of one machine. Machines that already
    /// have registered bearings are skipped, which keeps re-runs idempotent.
    async fn try_ingest_bearings(&self, machine_id: &str) -> Result<usize, IngestionError> {
        if self.store.has_bearings(machine_id)? {
            return Ok(0);
        }

        let feed_bearings = self.feed.fetch_bearings(machine_id).await?;
        if feed_bearings.is_empty() {
            return Ok(0);
        }

        let mut new_bearings = Vec::with_capacity(feed_bearings.len());
        for feed_bearing in feed_bearings {
            match NewBearing::new(
                feed_bearing.id.clone(),
                feed_bearing.machine_id,
                feed_bearing
                    .bearing_location
                    .unwrap_or_else(|| "Unknown".to_string()),
                feed_bearing.bearing_type,
                feed_bearing.position,
                feed_bearing.status,
            ) {
                Ok(bearing) => new_bearings.push(bearing),
                Err(e) => warn!("Skipping invalid bearing {}: {}", feed_bearing.id, e),
            }
        }
        Ok(self.store.insert_bearings(&new_bearings)?)
    }

    /// Fetches and writes the current reading of one bearing. The reading
    /// request carries the owning machine's type. Returns false when the feed
    /// has nothing to report.
    async fn try_ingest_reading(&self, bearing: &Bearing) -> Result<bool, IngestionError> {
        let machine_type = self
            .store
            .get_machine(&bearing.machine_id)?
            .and_then(|machine| machine.machine_type)
            .unwrap_or_else(|| FALLBACK_MACHINE_TYPE.to_string());

        let feed_reading = match self
            .feed
            .fetch_reading(
                &bearing.machine_id,
                &bearing.id,
                &machine_type,
                &self.axis,
                &self.analytics,
            )
            .await?
        {
            Some(reading) => reading,
            None => return Ok(false),
        };

        let reading = build_reading(bearing, feed_reading, &self.axis);
        self.store.insert_reading(&reading)?;
        Ok(true)
    }
}

/// Dates covered by one ingestion run: `backfill_days` days in total, the
/// last of them `end`. Zero means just `end`.
pub fn ingestion_dates(end: NaiveDate, backfill_days: u32) -> Vec<NaiveDate> {
    if backfill_days == 0 {
        return vec![end];
    }
    (0..backfill_days)
        .rev()
        .map(|i| end - chrono::Duration::days(i as i64))
        .collect()
}

fn build_reading(bearing: &Bearing, feed: FeedReading, axis: &str) -> NewReading {
    NewReading {
        id: feed.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        machine_id: bearing.machine_id.clone(),
        bearing_id: bearing.id.clone(),
        recorded_at: Some(Utc::now()),
        recorded_epoch: None,
        status: feed.status.unwrap_or_else(|| STATUS_NORMAL.to_string()),
        axis_id: axis.to_string(),
        acceleration: feed.acceleration,
        velocity: feed.velocity,
        temperature: feed.temperature,
        fft_data: feed.fft_data,
        analytics_type: feed.analytics_type,
        raw_data: feed.raw_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_build_reading_fills_defaults() {
        let bearing = Bearing {
            id: "bearing_001".to_string(),
            machine_id: "machine_001".to_string(),
            bearing_location: "Drive End".to_string(),
            bearing_type: None,
            position: None,
            status: STATUS_NORMAL.to_string(),
            created_at: Utc::now(),
        };
        let feed = FeedReading {
            id: None,
            status: None,
            acceleration: None,
            velocity: None,
            temperature: Some(61.2),
            fft_data: None,
            analytics_type: None,
            raw_data: None,
        };

        let reading = build_reading(&bearing, feed, "A-Axis");
        assert!(!reading.id.is_empty());
        assert_eq!(reading.status, STATUS_NORMAL);
        assert_eq!(reading.axis_id, "A-Axis");
        assert_eq!(reading.machine_id, "machine_001");
        assert!(reading.recorded_at.is_some());
        assert!(reading.recorded_epoch.is_none());
    }

    #[test]
    fn test_ingestion_dates_cover_the_backfill_window() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        // Without backfill only the end date runs.
        assert_eq!(ingestion_dates(end, 0), vec![end]);

        // N covers N days in total, oldest first, ending at `end`.
        let dates = ingestion_dates(end, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
                end,
            ]
        );
    }

    #[test]
    fn test_stats_merge() {
        let mut total = IngestionStats::default();
        total.merge(IngestionStats {
            machines: 2,
            bearings: 4,
            readings: 3,
            errors: 1,
        });
        total.merge(IngestionStats {
            machines: 1,
            bearings: 0,
            readings: 2,
            errors: 0,
        });

        assert_eq!(total.machines, 3);
        assert_eq!(total.bearings, 4);
        assert_eq!(total.readings, 5);
        assert_eq!(total.errors, 1);
        assert!(!total.is_clean());
    }
}

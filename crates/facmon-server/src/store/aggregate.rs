//! Pure aggregation over reading sets. Both store implementations fetch the
//! matching readings and fold them here, so the dashboard numbers cannot
//! drift between backends.

use std::collections::BTreeMap;

use chrono::Timelike;

use facmon_models::models::{HourlyTrend, KpiStats, StatusCounts, StatusTrend};
use facmon_models::models::Reading;

/// Total reading count plus per-status tallies. Unknown statuses contribute
/// to the total but not to any bucket.
pub fn kpi_stats(readings: &[Reading]) -> KpiStats {
    let mut stats = KpiStats {
        total_readings: readings.len() as i64,
        status_counts: StatusCounts::default(),
    };
    for reading in readings {
        stats.status_counts.record(&reading.status);
    }
    stats
}

/// Reading counts bucketed by hour of day, sorted by hour ascending. Hours
/// with no readings are omitted; readings without a resolvable timestamp are
/// skipped.
pub fn hourly_trend(readings: &[Reading]) -> Vec<HourlyTrend> {
    let mut buckets: BTreeMap<u32, i64> = BTreeMap::new();
    for reading in readings {
        if let Some(ts) = reading.timestamp() {
            *buckets.entry(ts.hour()).or_insert(0) += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(hour, count)| HourlyTrend { hour, count })
        .collect()
}

/// Per-day status tallies, sorted by date ascending. Readings without a
/// resolvable timestamp are skipped.
pub fn status_trend(readings: &[Reading]) -> Vec<StatusTrend> {
    let mut by_date: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for reading in readings {
        if let Some(ts) = reading.timestamp() {
            let day = ts.format("%Y-%m-%d").to_string();
            by_date.entry(day).or_default().record(&reading.status);
        }
    }
    by_date
        .into_iter()
        .map(|(date, status_counts)| StatusTrend {
            date,
            status_counts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(status: &str, ts: Option<chrono::DateTime<Utc>>) -> Reading {
        Reading {
            id: "reading_001".to_string(),
            machine_id: "machine_001".to_string(),
            bearing_id: "bearing_001".to_string(),
            recorded_at: ts,
            recorded_epoch: None,
            status: status.to_string(),
            axis_id: "A-Axis".to_string(),
            acceleration: None,
            velocity: None,
            temperature: None,
            fft_data: None,
            analytics_type: None,
            raw_data: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kpi_stats_counts_unknown_statuses_in_total_only() {
        let readings = vec![
            reading("Normal", None),
            reading("Alert", None),
            reading("Mystery", None),
        ];
        let stats = kpi_stats(&readings);

        assert_eq!(stats.total_readings, 3);
        assert_eq!(stats.status_counts.normal, 1);
        assert_eq!(stats.status_counts.alert, 1);
        assert_eq!(stats.status_counts.total(), 2);
    }

    #[test]
    fn test_hourly_trend_omits_empty_hours() {
        let at_three = Utc.with_ymd_and_hms(2025, 1, 15, 3, 30, 0).unwrap();
        let at_fourteen = Utc.with_ymd_and_hms(2025, 1, 15, 14, 5, 0).unwrap();
        let readings = vec![
            reading("Normal", Some(at_three)),
            reading("Normal", Some(at_three)),
            reading("Normal", Some(at_fourteen)),
            reading("Normal", None), // no timestamp, skipped
        ];
        let trend = hourly_trend(&readings);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].hour, 3);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[1].hour, 14);
        assert_eq!(trend[1].count, 1);
    }

    #[test]
    fn test_status_trend_groups_by_day_in_order() {
        let day_one = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2025, 1, 16, 8, 0, 0).unwrap();
        let readings = vec![
            reading("Alert", Some(day_two)),
            reading("Normal", Some(day_one)),
            reading("Normal", Some(day_one)),
        ];
        let trend = status_trend(&readings);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, "2025-01-15");
        assert_eq!(trend[0].status_counts.normal, 2);
        assert_eq!(trend[1].date, "2025-01-16");
        assert_eq!(trend[1].status_counts.alert, 1);
    }

    #[test]
    fn test_status_trend_resolves_epoch_timestamps() {
        let day = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        let mut epoch_reading = reading("Normal", None);
        epoch_reading.recorded_epoch = Some(day.timestamp() as f64);

        let trend = status_trend(&[epoch_reading]);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].date, "2025-01-15");
    }
}

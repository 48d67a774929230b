//! In-memory store used for demos and handler tests. Behavior mirrors the
//! live store, including the bearing-derived catalog fallback and timestamp
//! normalization, so tests exercise the same semantics the API serves.

use std::sync::Mutex;

use chrono::{Duration, Utc};

use facmon_models::filters::{DateRange, MachineFilter, ReadingFilter};
use facmon_models::models::{
    Bearing, HourlyTrend, KpiStats, Machine, NewBearing, NewMachine, NewReading, Reading,
    StatusTrend, SystemStats,
};

use crate::store::{aggregate, Store, StoreError};

#[derive(Default)]
struct Inner {
    machines: Vec<Machine>,
    bearings: Vec<Bearing>,
    readings: Vec<Reading>,
}

#[derive(Default)]
pub struct FixtureStore {
    inner: Mutex<Inner>,
}

impl FixtureStore {
    pub fn new() -> Self {
        FixtureStore::default()
    }

    /// A store pre-seeded with a small plant: two machines, two bearings
    /// each, and a handful of readings in both timestamp forms.
    pub fn with_sample_data() -> Self {
        let store = FixtureStore::new();
        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();

        {
            let mut inner = store.inner.lock().expect("fixture store poisoned");

            for (id, name, machine_type) in [
                ("machine_001", "Pump A1", "PUMP"),
                ("machine_002", "Motor B2", "MOTOR"),
            ] {
                inner.machines.push(Machine {
                    id: id.to_string(),
                    machine_name: name.to_string(),
                    customer: "Factory Corp".to_string(),
                    area: "Production".to_string(),
                    subarea: "Line 1".to_string(),
                    machine_type: Some(machine_type.to_string()),
                    status: "Normal".to_string(),
                    ingested_date: Some(today.clone()),
                    created_at: now,
                    updated_at: now,
                });

                for (suffix, location) in [("a", "Drive End"), ("b", "Non-Drive End")] {
                    inner.bearings.push(Bearing {
                        id: format!("{}_bearing_{}", id, suffix),
                        machine_id: id.to_string(),
                        bearing_location: location.to_string(),
                        bearing_type: Some("Roller".to_string()),
                        position: None,
                        status: "Normal".to_string(),
                        created_at: now,
                    });
                }
            }

            for (i, (machine_id, bearing_suffix, status)) in [
                ("machine_001", "a", "Normal"),
                ("machine_001", "b", "Alert"),
                ("machine_002", "a", "Normal"),
                ("machine_002", "b", "Satisfactory"),
            ]
            .iter()
            .enumerate()
            {
                let recorded = now - Duration::hours(i as i64 + 1);
                // Alternate which representation carries the timestamp.
                let (recorded_at, recorded_epoch) = if i % 2 == 0 {
                    (Some(recorded), None)
                } else {
                    (None, Some(recorded.timestamp() as f64))
                };
                inner.readings.push(Reading {
                    id: format!("reading_{:03}", i + 1),
                    machine_id: machine_id.to_string(),
                    bearing_id: format!("{}_bearing_{}", machine_id, bearing_suffix),
                    recorded_at,
                    recorded_epoch,
                    status: status.to_string(),
                    axis_id: "A-Axis".to_string(),
                    acceleration: Some(serde_json::json!({"rms": 0.42 + i as f64 / 10.0})),
                    velocity: Some(serde_json::json!({"rms": 1.1})),
                    temperature: Some(58.5),
                    fft_data: Some(serde_json::json!({"frequencies": [10, 20], "amplitudes": [0.1, 0.2]})),
                    analytics_type: Some("MF".to_string()),
                    raw_data: None,
                    created_at: now,
                });
            }
        }

        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fixture store poisoned")
    }

    fn readings_in_range(&self, range: &DateRange, dual: bool) -> Vec<Reading> {
        self.lock()
            .readings
            .iter()
            .filter(|r| {
                if dual {
                    range.matches_reading(r)
                } else {
                    range.matches_instant_only(r)
                }
            })
            .cloned()
            .collect()
    }
}

impl Store for FixtureStore {
    fn list_machines(&self, filter: &MachineFilter) -> Result<Vec<Machine>, StoreError> {
        let inner = self.lock();
        let matched: Vec<Machine> = inner
            .machines
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        if !matched.is_empty() {
            return Ok(matched);
        }

        // Catalog came up empty: derive placeholder machines from the ids
        // the bearing registry knows about.
        let mut machine_ids: Vec<&str> = inner
            .bearings
            .iter()
            .map(|b| b.machine_id.as_str())
            .collect();
        machine_ids.sort_unstable();
        machine_ids.dedup();
        Ok(machine_ids.iter().map(|id| Machine::placeholder(id)).collect())
    }

    fn get_machine(&self, id: &str) -> Result<Option<Machine>, StoreError> {
        Ok(self.lock().machines.iter().find(|m| m.id == id).cloned())
    }

    fn upsert_machine(&self, machine: &NewMachine) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        if let Some(existing) = inner.machines.iter_mut().find(|m| m.id == machine.id) {
            existing.machine_name = machine.machine_name.clone();
            existing.customer = machine.customer.clone();
            existing.area = machine.area.clone();
            existing.subarea = machine.subarea.clone();
            existing.machine_type = machine.machine_type.clone();
            existing.status = machine.status.clone();
            existing.ingested_date = machine.ingested_date.clone();
            existing.updated_at = now;
        } else {
            inner.machines.push(Machine {
                id: machine.id.clone(),
                machine_name: machine.machine_name.clone(),
                customer: machine.customer.clone(),
                area: machine.area.clone(),
                subarea: machine.subarea.clone(),
                machine_type: machine.machine_type.clone(),
                status: machine.status.clone(),
                ingested_date: machine.ingested_date.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(true)
    }

    fn machines_ingested_on(&self, date: &str) -> Result<Vec<Machine>, StoreError> {
        Ok(self
            .lock()
            .machines
            .iter()
            .filter(|m| m.ingested_date.as_deref() == Some(date))
            .cloned()
            .collect())
    }

    fn bearings_for_machine(&self, machine_id: &str) -> Result<Vec<Bearing>, StoreError> {
        Ok(self
            .lock()
            .bearings
            .iter()
            .filter(|b| b.machine_id == machine_id)
            .cloned()
            .collect())
    }

    fn has_bearings(&self, machine_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock().bearings.iter().any(|b| b.machine_id == machine_id))
    }

    fn insert_bearings(&self, bearings: &[NewBearing]) -> Result<usize, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        for bearing in bearings {
            inner.bearings.push(Bearing {
                id: bearing.id.clone(),
                machine_id: bearing.machine_id.clone(),
                bearing_location: bearing.bearing_location.clone(),
                bearing_type: bearing.bearing_type.clone(),
                position: bearing.position.clone(),
                status: bearing.status.clone(),
                created_at: now,
            });
        }
        Ok(bearings.len())
    }

    fn all_bearings(&self) -> Result<Vec<Bearing>, StoreError> {
        Ok(self.lock().bearings.clone())
    }

    fn query_readings(&self, filter: &ReadingFilter, limit: i64) -> Result<Vec<Reading>, StoreError> {
        let mut matched: Vec<Reading> = self
            .lock()
            .readings
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // Newest first; readings with no resolvable timestamp sort last.
        matched.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        matched.truncate(limit as usize);
        Ok(matched.into_iter().map(Reading::normalize).collect())
    }

    fn latest_readings(&self, machine_id: &str) -> Result<Vec<Reading>, StoreError> {
        let inner = self.lock();
        let mut bearing_ids: Vec<&str> = inner
            .readings
            .iter()
            .filter(|r| r.machine_id == machine_id)
            .map(|r| r.bearing_id.as_str())
            .collect();
        bearing_ids.sort_unstable();
        bearing_ids.dedup();

        let mut latest = Vec::with_capacity(bearing_ids.len());
        for bearing_id in bearing_ids {
            let winner = inner
                .readings
                .iter()
                .filter(|r| r.machine_id == machine_id && r.bearing_id == bearing_id)
                // Newest wins; on equal timestamps the smallest id wins.
                .min_by(|a, b| {
                    b.timestamp()
                        .cmp(&a.timestamp())
                        .then_with(|| a.id.cmp(&b.id))
                });
            if let Some(reading) = winner {
                latest.push(reading.clone().normalize());
            }
        }
        Ok(latest)
    }

    fn get_reading(&self, id: &str) -> Result<Option<Reading>, StoreError> {
        Ok(self
            .lock()
            .readings
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(Reading::normalize))
    }

    fn insert_reading(&self, reading: &NewReading) -> Result<(), StoreError> {
        self.lock().readings.push(Reading {
            id: reading.id.clone(),
            machine_id: reading.machine_id.clone(),
            bearing_id: reading.bearing_id.clone(),
            recorded_at: reading.recorded_at,
            recorded_epoch: reading.recorded_epoch,
            status: reading.status.clone(),
            axis_id: reading.axis_id.clone(),
            acceleration: reading.acceleration.clone(),
            velocity: reading.velocity.clone(),
            temperature: reading.temperature,
            fft_data: reading.fft_data.clone(),
            analytics_type: reading.analytics_type.clone(),
            raw_data: reading.raw_data.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn kpi_stats(&self, range: &DateRange, dual_timestamps: bool) -> Result<KpiStats, StoreError> {
        let readings = self.readings_in_range(range, dual_timestamps);
        Ok(aggregate::kpi_stats(&readings))
    }

    fn hourly_trend(&self, range: &DateRange) -> Result<Vec<HourlyTrend>, StoreError> {
        let readings = self.readings_in_range(range, true);
        Ok(aggregate::hourly_trend(&readings))
    }

    fn status_trend(
        &self,
        range: &DateRange,
        customer: Option<&str>,
    ) -> Result<Vec<StatusTrend>, StoreError> {
        let machine_ids: Option<Vec<String>> = customer.map(|customer| {
            self.lock()
                .machines
                .iter()
                .filter(|m| m.customer == customer)
                .map(|m| m.id.clone())
                .collect()
        });
        if let Some(ref ids) = machine_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
        }

        let readings: Vec<Reading> = self
            .readings_in_range(range, true)
            .into_iter()
            .filter(|r| match machine_ids {
                Some(ref ids) => ids.contains(&r.machine_id),
                None => true,
            })
            .collect();
        Ok(aggregate::status_trend(&readings))
    }

    fn system_stats(&self) -> Result<SystemStats, StoreError> {
        let machines = self.list_machines(&MachineFilter::default())?;
        let inner = self.lock();
        Ok(SystemStats {
            machines_count: machines.len() as i64,
            bearings_count: inner.bearings.len() as i64,
            data_records_count: inner.readings.len() as i64,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_fallback_synthesizes_from_bearings() {
        let store = FixtureStore::new();
        store
            .insert_bearings(&[
                NewBearing::new(
                    "bearing_001".to_string(),
                    "machine_007".to_string(),
                    "Drive End".to_string(),
                    None,
                    None,
                    None,
                )
                .unwrap(),
                NewBearing::new(
                    "bearing_002".to_string(),
                    "machine_007".to_string(),
                    "Non-Drive End".to_string(),
                    None,
                    None,
                    None,
                )
                .unwrap(),
            ])
            .unwrap();

        let machines = store.list_machines(&MachineFilter::default()).unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].id, "machine_007");
        assert_eq!(machines[0].customer, "Unknown");
    }

    #[test]
    fn test_sample_data_latest_readings_one_per_bearing() {
        let store = FixtureStore::with_sample_data();
        let latest = store.latest_readings("machine_001").unwrap();

        assert_eq!(latest.len(), 2);
        // Normalization: no epoch-only timestamps leave the store.
        for reading in &latest {
            assert!(reading.recorded_at.is_some());
            assert!(reading.recorded_epoch.is_none());
        }
    }

    #[test]
    fn test_upsert_machine_replaces_in_place() {
        let store = FixtureStore::new();
        let first = NewMachine::new(
            "machine_001".to_string(),
            "Pump A1".to_string(),
            "Factory Corp".to_string(),
            "Production".to_string(),
            "Line 1".to_string(),
            Some("PUMP".to_string()),
            None,
            Some("2025-01-15".to_string()),
        )
        .unwrap();
        assert!(store.upsert_machine(&first).unwrap());

        let mut second = first.clone();
        second.machine_name = "Pump A1 (rebuilt)".to_string();
        assert!(store.upsert_machine(&second).unwrap());

        let machines = store.list_machines(&MachineFilter::default()).unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].machine_name, "Pump A1 (rebuilt)");
    }

    #[test]
    fn test_system_stats_counts_synthesized_machines() {
        let store = FixtureStore::new();
        store
            .insert_bearings(&[NewBearing::new(
                "bearing_001".to_string(),
                "machine_007".to_string(),
                "Drive End".to_string(),
                None,
                None,
                None,
            )
            .unwrap()])
            .unwrap();

        let stats = store.system_stats().unwrap();
        assert_eq!(stats.machines_count, 1);
        assert_eq!(stats.bearings_count, 1);
        assert_eq!(stats.data_records_count, 0);
    }
}

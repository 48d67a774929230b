//! Query filter types shared by the store implementations.
//!
//! Filters are built once at the API boundary and handed to a store: the
//! live store compiles them into SQL predicates, the fixture store evaluates
//! the `matches` methods directly. Empty strings and absent values are
//! criteria that were not supplied, never filters.

use chrono::{DateTime, Utc};

use crate::models::{Machine, Reading};

/// Inclusive timestamp range. Because readings persist their timestamp in
/// either structured or epoch-seconds form, a range can be evaluated against
/// both representations; a record matches if either one falls in range.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        DateRange { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Lower bound expressed in the numeric storage domain.
    pub fn start_epoch(&self) -> Option<f64> {
        self.start.map(|t| t.timestamp() as f64)
    }

    /// Upper bound expressed in the numeric storage domain.
    pub fn end_epoch(&self) -> Option<f64> {
        self.end.map(|t| t.timestamp() as f64)
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if instant < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if instant > end {
                return false;
            }
        }
        true
    }

    pub fn contains_epoch(&self, epoch: f64) -> bool {
        if let Some(start) = self.start_epoch() {
            if epoch < start {
                return false;
            }
        }
        if let Some(end) = self.end_epoch() {
            if epoch > end {
                return false;
            }
        }
        true
    }

    /// Dual-format match: either stored representation in range qualifies.
    pub fn matches_reading(&self, reading: &Reading) -> bool {
        if self.is_unbounded() {
            return true;
        }
        if let Some(instant) = reading.recorded_at {
            if self.contains_instant(instant) {
                return true;
            }
        }
        if let Some(epoch) = reading.recorded_epoch {
            if self.contains_epoch(epoch) {
                return true;
            }
        }
        false
    }

    /// Structured-instant-only match. Records holding only the numeric form
    /// never qualify once a bound is set; with no bounds everything matches.
    pub fn matches_instant_only(&self, reading: &Reading) -> bool {
        if self.is_unbounded() {
            return true;
        }
        reading
            .recorded_at
            .map(|instant| self.contains_instant(instant))
            .unwrap_or(false)
    }
}

/// Machine catalog filter. Text fields are case-insensitive substring
/// criteria, status is exact-match, and the ingestion-date bounds compare
/// lexically against the zero-padded `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default)]
pub struct MachineFilter {
    pub customer: Option<String>,
    pub area: Option<String>,
    pub subarea: Option<String>,
    pub machine_name: Option<String>,
    pub status: Option<String>,
    pub ingested_after: Option<String>,
    pub ingested_before: Option<String>,
}

impl MachineFilter {
    /// Drops empty-string criteria so they are treated as absent.
    pub fn normalized(mut self) -> Self {
        let drop_empty = |field: &mut Option<String>| {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        };
        drop_empty(&mut self.customer);
        drop_empty(&mut self.area);
        drop_empty(&mut self.subarea);
        drop_empty(&mut self.machine_name);
        drop_empty(&mut self.status);
        drop_empty(&mut self.ingested_after);
        drop_empty(&mut self.ingested_before);
        self
    }

    pub fn matches(&self, machine: &Machine) -> bool {
        if let Some(ref customer) = self.customer {
            if !contains_ci(&machine.customer, customer) {
                return false;
            }
        }
        if let Some(ref area) = self.area {
            if !contains_ci(&machine.area, area) {
                return false;
            }
        }
        if let Some(ref subarea) = self.subarea {
            if !contains_ci(&machine.subarea, subarea) {
                return false;
            }
        }
        if let Some(ref name) = self.machine_name {
            if !contains_ci(&machine.machine_name, name) {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if machine.status != *status {
                return false;
            }
        }
        if let Some(ref after) = self.ingested_after {
            match machine.ingested_date {
                Some(ref date) if date.as_str() >= after.as_str() => {}
                _ => return false,
            }
        }
        if let Some(ref before) = self.ingested_before {
            match machine.ingested_date {
                Some(ref date) if date.as_str() <= before.as_str() => {}
                _ => return false,
            }
        }
        true
    }
}

/// Reading store filter: optional bearing/machine equality plus a date range.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub bearing_id: Option<String>,
    pub machine_id: Option<String>,
    pub range: DateRange,
}

impl ReadingFilter {
    pub fn matches(&self, reading: &Reading) -> bool {
        if let Some(ref bearing_id) = self.bearing_id {
            if reading.bearing_id != *bearing_id {
                return false;
            }
        }
        if let Some(ref machine_id) = self.machine_id {
            if reading.machine_id != *machine_id {
                return false;
            }
        }
        self.range.matches_reading(reading)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

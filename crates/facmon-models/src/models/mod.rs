pub mod bearings;
pub mod dashboard;
pub mod machines;
pub mod readings;

pub use bearings::{Bearing, NewBearing};
pub use dashboard::{HourlyTrend, KpiStats, StatusCounts, StatusTrend, SystemStats};
pub use machines::{Machine, NewMachine};
pub use readings::{NewReading, Reading};

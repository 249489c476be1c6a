//! Re-tiles satellite radiance observation files from one set of overlapping
//! time windows into another, without holding more than the overlapping
//! source windows in memory.

pub mod benchmark;
pub mod config;
pub mod driver;
pub mod record;
pub mod station;
pub mod window;

pub use config::{MigrationConfig, StationConfig};
pub use driver::{SatelliteOutcome, migrate};
pub use record::{Observation, Record, RecordLayout, Timestamp};
pub use station::{SatWorkStation, Satellite, Step, SweepReport};
pub use window::{Error, TimeWindow, WindowAssemble};

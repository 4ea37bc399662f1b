//! Migration engine: walks the work items, calls the gateway, records
//! progress and decides when to stop.

pub mod migrate;
pub mod throttle;

pub use migrate::{MigrationEngine, start_summary};
pub use throttle::Throttle;

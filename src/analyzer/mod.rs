pub mod columns;
pub mod diff;
pub mod hotspots;
pub mod leaks;
pub mod timeseries;

pub use columns::*;
pub use diff::*;
pub use hotspots::*;
pub use leaks::*;
pub use timeseries::*;

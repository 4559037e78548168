//! pprof-lens core library: hotspot, diff, leak and heap-trend analysis of
//! Go pprof profiles, rendered as text, markdown or JSON.

pub mod analyzer;
pub mod cmd;
pub mod render;
pub mod source;

mod config;
mod error;
mod fsutil;
mod profile;
mod units;

pub use analyzer::{
    analyze_allocs_profile, analyze_block_profile, analyze_cpu_profile, analyze_goroutine_profile,
    analyze_heap_profile, analyze_heap_time_series, analyze_mutex_profile, analyze_profile, compare_profiles,
    detect_memory_leaks,
};
pub use config::*;
pub use error::*;
pub use fsutil::*;
pub use profile::*;
pub use render::{OutputFormat, ReportRenderer};
pub use units::*;

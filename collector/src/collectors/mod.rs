//! # Collectors Module
//!
//! The collection and aggregation engine.
//!
//! ## Architecture
//!
//! - **`Consumer` trait**: Receives the snapshot of every refresh cycle
//! - **`discovery`**: Lists the instance directories below the findings directory
//! - **`stats_parser`** / **`plot_parser`**: Read what each instance reports about itself
//! - **`liveness`**: Checks whether that report still describes a running process
//! - **`scheduler`**: Collects all instances concurrently over a bounded pool
//! - **`aggregator`**: Reduces the instances into one campaign summary
//! - **`Monitor`**: Runs the refresh cycle end to end
//!
//! ## Data Sources
//!
//! - **`fuzzer_stats`**: Current counters of each instance
//! - **`fuzzer_setup`**: Startup marker written before the first stats
//! - **`plot_data`**: Historical counters of each instance
//! - **The OS**: Process existence and resource usage

pub mod aggregator;
pub mod consumer;
pub mod discovery;
pub mod liveness;
pub mod orchestrator;
pub mod plot_parser;
pub mod scheduler;
pub mod stats_parser;
pub mod system;
pub mod warnings;

// Re-export the main types for easy access
pub use aggregator::aggregate;
pub use consumer::Consumer;
pub use discovery::discover_instances;
pub use liveness::{
    BoxFuture,
    FixedStartup,
    LivenessProbe,
    MarkerStartupCheck,
    OsProbe,
    ProbeVerdict,
    StartupCheck,
    StaticProbe,
};
pub use orchestrator::Monitor;
pub use plot_parser::parse_plot_file;
pub use scheduler::CollectionScheduler;
pub use stats_parser::parse_stats_file;
pub use system::collect_system_info;
pub use warnings::{
    instance_warnings,
    InstanceWarning,
};

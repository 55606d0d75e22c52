//! # AFL Monitor Collector
//!
//! The collection and aggregation engine behind `afl-monitor`. One call to
//! [`Monitor::refresh`] produces an immutable [`Snapshot`] of a fuzzing
//! campaign: every instance found under the findings directory, whether its
//! process is really alive, and a campaign-wide [`CampaignSummary`] with deltas
//! against the previous cycle.
//!
//! ## Architecture
//!
//! - **`config`**: Immutable settings for one engine instance
//! - **`metrics`**: Per-instance records, the campaign summary, time series points and the snapshot
//! - **`collectors`**: The engine itself
//!   - **`discovery`**: Lists candidate instance directories
//!   - **`stats_parser`**: Parses `fuzzer_stats`
//!   - **`plot_parser`**: Parses and down-samples `plot_data`
//!   - **`liveness`**: Process liveness and resource sampling
//!   - **`scheduler`**: Bounded concurrent fan-out over instances
//!   - **`aggregator`**: Campaign-level reduction
//!   - **`warnings`**: Per-instance health diagnostics
//!   - **`system`**: Host resource sample
//!   - **`Monitor`**: Runs a refresh cycle and feeds registered consumers
//! - **`state`**: Persistence of the previous summary
//!
//! ## Usage
//!
//! ```no_run
//! use afl_monitor_collector::{
//!     CollectorConfig,
//!     FileStateStore,
//!     Monitor,
//!     OsProbe,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> eyre::Result<()> {
//! let config = CollectorConfig::new("/path/to/sync_dir");
//! let probe = Arc::new(OsProbe::new(config.probe.clone()));
//! let store = Box::new(FileStateStore::new("/tmp/afl-monitor-state.json"));
//! let mut monitor = Monitor::new(config, probe, store);
//! let snapshot = monitor.refresh().await?;
//! println!("{} alive", snapshot.summary.alive_fuzzers);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod config;
mod error;
pub mod metrics;
pub mod state;

pub use collectors::*;
pub use config::{
    CollectorConfig,
    ProbeSettings,
};
pub use error::Error;
pub use metrics::*;
pub use state::{
    FileStateStore,
    MemoryStateStore,
    PersistedState,
    StateStore,
};

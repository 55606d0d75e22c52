//! # Configuration Module
//!
//! Settings for one engine instance. The application builds a
//! [`CollectorConfig`] once from its own layered configuration and hands it to
//! the [`Monitor`](crate::Monitor); nothing in the engine reads global state.
//!
//! ## Configuration Fields
//!
//! - **Findings directory**: The sync directory holding one subdirectory per instance
//! - **Visibility**: Whether dead instances are kept in the snapshot
//! - **Pool size**: Upper bound on concurrently collected instances
//! - **Probe settings**: Per-instance timeout and the startup heuristic thresholds
//! - **Plot settings**: Maximum number of time series points returned per instance

use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_PLOT_MAX_POINTS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub findings_dir: PathBuf,
    pub show_dead: bool,
    pub max_workers: usize,
    pub plot_max_points: usize,
    pub probe: ProbeSettings,
}

impl CollectorConfig {
    pub fn new(findings_dir: impl Into<PathBuf>) -> Self {
        Self {
            findings_dir: findings_dir.into(),
            show_dead: false,
            max_workers: DEFAULT_MAX_WORKERS,
            plot_max_points: DEFAULT_PLOT_MAX_POINTS,
            probe: ProbeSettings::default(),
        }
    }

    pub fn with_show_dead(mut self, show_dead: bool) -> Self {
        self.show_dead = show_dead;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_plot_max_points(mut self, plot_max_points: usize) -> Self {
        self.plot_max_points = plot_max_points;
        self
    }

    pub fn with_probe(mut self, probe: ProbeSettings) -> Self {
        self.probe = probe;
        self
    }
}

/// Timeouts and thresholds used while deciding whether an instance is alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Upper bound for probing one instance. On expiry the instance is reported as unknown.
    pub probe_timeout: Duration,
    /// A setup marker touched within this window counts as a starting instance.
    pub startup_grace: Duration,
    /// Upper bound for the external lookup of processes using the instance directory.
    pub dir_lookup_timeout: Duration,
    /// Sampling window for per-process CPU usage.
    pub cpu_sample_interval: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            startup_grace: Duration::from_secs(60),
            dir_lookup_timeout: Duration::from_secs(2),
            cpu_sample_interval: Duration::from_millis(200),
        }
    }
}

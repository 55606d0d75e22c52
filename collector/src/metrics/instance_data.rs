use super::{
    InstanceStatus,
    NOT_APPLICABLE,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

/// One fuzzer instance as observed during a single refresh cycle.
///
/// Counter fields come from the instance's own `fuzzer_stats`; `status`,
/// `cpu_usage` and `memory_usage` are filled in by the liveness probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStats {
    pub name: String,
    pub dir: PathBuf,
    pub status: InstanceStatus,
    pub fuzzer_pid: i64,

    // Execution
    pub start_time: i64,
    pub last_update: i64,
    pub run_time: u64,
    pub execs_done: u64,
    pub execs_per_sec: f64,
    pub execs_ps_last_min: f64,

    // Corpus
    pub corpus_count: u64,
    pub corpus_favored: u64,
    pub corpus_found: u64,
    pub pending_total: u64,
    pub pending_favs: u64,
    pub cur_item: u64,
    pub max_depth: u64,

    // Coverage
    pub bitmap_cvg: f64,
    pub edges_found: u64,
    pub total_edges: u64,
    /// Percent of reproducible coverage; zero or below means not reported yet.
    pub stability: f64,

    // Last finds, epoch seconds, zero for never
    pub last_find: i64,
    pub last_crash: i64,
    pub last_hang: i64,

    // Cycles
    pub cycles_done: u64,
    pub cycles_wo_finds: i64,

    // Faults
    pub saved_crashes: u64,
    pub saved_hangs: u64,
    pub total_tmout: u64,

    // Descriptive
    pub exec_timeout: u64,
    pub peak_rss_mb: u64,
    pub afl_banner: String,
    pub afl_version: String,
    pub command_line: String,

    // Resources, percent; -1 when the process could not be inspected
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

impl InstanceStats {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            status: InstanceStatus::Unknown,
            fuzzer_pid: 0,
            start_time: 0,
            last_update: 0,
            run_time: 0,
            execs_done: 0,
            execs_per_sec: 0.0,
            execs_ps_last_min: 0.0,
            corpus_count: 0,
            corpus_favored: 0,
            corpus_found: 0,
            pending_total: 0,
            pending_favs: 0,
            cur_item: 0,
            max_depth: 0,
            bitmap_cvg: 0.0,
            edges_found: 0,
            total_edges: 0,
            stability: 0.0,
            last_find: 0,
            last_crash: 0,
            last_hang: 0,
            cycles_done: 0,
            cycles_wo_finds: NOT_APPLICABLE,
            saved_crashes: 0,
            saved_hangs: 0,
            total_tmout: 0,
            exec_timeout: 0,
            peak_rss_mb: 0,
            afl_banner: String::new(),
            afl_version: String::new(),
            command_line: String::new(),
            cpu_usage: 0.0,
            memory_usage: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    pub fn has_stability(&self) -> bool {
        self.stability > 0.0
    }

    /// Share of executions that timed out, in percent.
    pub fn timeout_ratio(&self) -> Option<f64> {
        if self.execs_done == 0 {
            return None;
        }
        Some(self.total_tmout as f64 / self.execs_done as f64 * 100.0)
    }
}

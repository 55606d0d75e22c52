use serde::{
    Deserialize,
    Serialize,
};

/// Placeholder for `cycles_wo_finds` when no instance reports the counter.
pub const CYCLES_WO_FINDS_NA: &str = "N/A";

/// Campaign-wide reduction over all instances of one refresh cycle.
///
/// Missing fields deserialize to their defaults so that a state file written
/// by an older version still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSummary {
    // Instance counts
    pub total_fuzzers: usize,
    pub alive_fuzzers: usize,
    pub dead_fuzzers: usize,
    pub starting_fuzzers: usize,

    // Execution, speeds count alive instances only
    pub total_execs: u64,
    pub total_speed: f64,
    pub current_avg_speed: f64,
    pub avg_speed_per_core: f64,

    // Corpus
    pub total_corpus: u64,
    pub total_pending: u64,
    pub total_pending_favs: u64,

    // Coverage
    pub max_coverage: f64,
    pub avg_stability: f64,
    pub min_stability: f64,
    pub max_stability: f64,
    pub total_edges_found: u64,
    pub max_total_edges: u64,

    // Findings
    pub total_crashes: u64,
    pub total_hangs: u64,
    pub new_crashes: u64,
    pub new_hangs: u64,

    // Timing
    pub total_runtime: u64,
    pub last_find_time: i64,
    pub last_crash_time: i64,
    pub last_hang_time: i64,

    // Cycles
    pub max_cycle: u64,
    pub avg_cycle: f64,
    pub cycles_wo_finds: String,

    // Resources, percent
    pub total_cpu_usage: f64,
    pub total_memory_usage: f64,
}

impl Default for CampaignSummary {
    fn default() -> Self {
        Self {
            total_fuzzers: 0,
            alive_fuzzers: 0,
            dead_fuzzers: 0,
            starting_fuzzers: 0,
            total_execs: 0,
            total_speed: 0.0,
            current_avg_speed: 0.0,
            avg_speed_per_core: 0.0,
            total_corpus: 0,
            total_pending: 0,
            total_pending_favs: 0,
            max_coverage: 0.0,
            avg_stability: 0.0,
            min_stability: 0.0,
            max_stability: 0.0,
            total_edges_found: 0,
            max_total_edges: 0,
            total_crashes: 0,
            total_hangs: 0,
            new_crashes: 0,
            new_hangs: 0,
            total_runtime: 0,
            last_find_time: 0,
            last_crash_time: 0,
            last_hang_time: 0,
            max_cycle: 0,
            avg_cycle: 0.0,
            cycles_wo_finds: CYCLES_WO_FINDS_NA.to_string(),
            total_cpu_usage: 0.0,
            total_memory_usage: 0.0,
        }
    }
}

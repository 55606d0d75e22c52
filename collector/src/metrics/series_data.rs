use serde::{
    Deserialize,
    Serialize,
};

/// One row of an instance's `plot_data` log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    /// Seconds since the instance started (absolute epoch seconds in old AFL versions).
    pub relative_time: u64,
    pub cycles_done: u64,
    pub cur_item: u64,
    pub corpus_count: u64,
    pub pending_total: u64,
    pub pending_favs: u64,
    /// Bitmap coverage in percent.
    pub map_size: f64,
    pub saved_crashes: u64,
    pub saved_hangs: u64,
    pub max_depth: u64,
    pub execs_per_sec: f64,
    pub total_execs: u64,
    pub edges_found: u64,
    pub total_crashes: u64,
    pub servers_count: u64,
}

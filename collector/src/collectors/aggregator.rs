use crate::metrics::{
    CampaignSummary,
    InstanceStats,
    InstanceStatus,
    CYCLES_WO_FINDS_NA,
};

/// Reduces the instances of one cycle into a campaign summary.
///
/// Total over any input, including the empty list, and independent of input
/// order. Deltas are taken against `previous` and never go below zero: a
/// shrinking total (an instance disappeared, crashes were pruned) reports no
/// new findings rather than a negative count.
pub fn aggregate(instances: &[InstanceStats], previous: Option<&CampaignSummary>) -> CampaignSummary {
    let mut summary = CampaignSummary::default();
    if instances.is_empty() {
        return summary;
    }

    let count = |status: InstanceStatus| instances.iter().filter(|s| s.status == status).count();
    summary.total_fuzzers = instances.len();
    summary.alive_fuzzers = count(InstanceStatus::Alive);
    summary.dead_fuzzers = count(InstanceStatus::Dead);
    summary.starting_fuzzers = count(InstanceStatus::Starting);

    let alive = || instances.iter().filter(|s| s.is_alive());
    summary.total_execs = instances.iter().map(|s| s.execs_done).sum();
    summary.total_speed = alive().map(|s| s.execs_per_sec).sum();
    summary.current_avg_speed = alive().map(|s| s.execs_ps_last_min).sum();
    if summary.alive_fuzzers > 0 {
        summary.avg_speed_per_core = summary.total_speed / summary.alive_fuzzers as f64;
    }

    summary.total_corpus = instances.iter().map(|s| s.corpus_count).sum();
    summary.total_pending = instances.iter().map(|s| s.pending_total).sum();
    summary.total_pending_favs = instances.iter().map(|s| s.pending_favs).sum();

    // Coverage overlaps between instances, so only the maximum is meaningful.
    summary.max_coverage = instances.iter().map(|s| s.bitmap_cvg).fold(0.0, f64::max);
    summary.total_edges_found = instances.iter().map(|s| s.edges_found).sum();
    summary.max_total_edges = instances.iter().map(|s| s.total_edges).max().unwrap_or(0);

    let stabilities: Vec<f64> = instances
        .iter()
        .filter(|s| s.has_stability())
        .map(|s| s.stability)
        .collect();
    if !stabilities.is_empty() {
        summary.avg_stability = stabilities.iter().sum::<f64>() / stabilities.len() as f64;
        summary.min_stability = stabilities.iter().copied().fold(f64::INFINITY, f64::min);
        summary.max_stability = stabilities.iter().copied().fold(0.0, f64::max);
    }

    summary.total_crashes = instances.iter().map(|s| s.saved_crashes).sum();
    summary.total_hangs = instances.iter().map(|s| s.saved_hangs).sum();
    if let Some(previous) = previous {
        summary.new_crashes = summary.total_crashes.saturating_sub(previous.total_crashes);
        summary.new_hangs = summary.total_hangs.saturating_sub(previous.total_hangs);
    }

    summary.total_runtime = instances.iter().map(|s| s.run_time).sum();
    summary.last_find_time = instances.iter().map(|s| s.last_find).max().unwrap_or(0);
    summary.last_crash_time = instances.iter().map(|s| s.last_crash).max().unwrap_or(0);
    summary.last_hang_time = instances.iter().map(|s| s.last_hang).max().unwrap_or(0);

    let cycles: Vec<u64> = instances
        .iter()
        .map(|s| s.cycles_done)
        .filter(|c| *c > 0)
        .collect();
    if !cycles.is_empty() {
        summary.max_cycle = cycles.iter().copied().max().unwrap_or(0);
        summary.avg_cycle = cycles.iter().sum::<u64>() as f64 / cycles.len() as f64;
    }

    let without_finds: Vec<String> = instances
        .iter()
        .filter(|s| s.cycles_wo_finds >= 0)
        .map(|s| s.cycles_wo_finds.to_string())
        .collect();
    summary.cycles_wo_finds = if without_finds.is_empty() {
        CYCLES_WO_FINDS_NA.to_string()
    } else {
        without_finds.join("/")
    };

    summary.total_cpu_usage = instances.iter().map(|s| s.cpu_usage).filter(|u| *u >= 0.0).sum();
    summary.total_memory_usage = instances.iter().map(|s| s.memory_usage).filter(|u| *u >= 0.0).sum();

    summary
}

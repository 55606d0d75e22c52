//! Parser for the `fuzzer_stats` file every AFL instance rewrites periodically.
//!
//! The format is one `key : value` pair per line. Key order is not fixed, new
//! AFL versions add keys, old versions use different names for some of them,
//! and numeric values may carry a trailing `%`.

use crate::metrics::InstanceStats;
use std::path::Path;

pub const STATS_FILE: &str = "fuzzer_stats";

/// Reads and parses `path`. Returns `None` when the file cannot be read or
/// does not contain a single `key : value` line. Invalid UTF-8 is replaced,
/// `command_line` holds raw argv bytes.
pub async fn parse_stats_file(path: &Path, name: &str) -> Option<InstanceStats> {
    let content = match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot read stats file");
            return None;
        }
    };
    let dir = path.parent().unwrap_or(path);
    let stats = parse_stats(&content, name, dir);
    if stats.is_none() {
        debug!(path = %path.display(), "Stats file holds no key/value pairs");
    }
    stats
}

/// Parses stats content. Malformed lines are skipped, the remaining lines
/// still populate the record.
pub fn parse_stats(content: &str, name: &str, dir: &Path) -> Option<InstanceStats> {
    let mut stats = InstanceStats::new(name, dir);
    let mut pairs = 0usize;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                trace!(instance = name, line, "Skipping line without delimiter");
            }
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs += 1;
        if let Err(reason) = apply(&mut stats, key, value.trim()) {
            trace!(instance = name, key, value = value.trim(), reason, "Skipping malformed value");
        }
    }

    (pairs > 0).then_some(stats)
}

fn apply(stats: &mut InstanceStats, key: &str, value: &str) -> Result<(), &'static str> {
    match key {
        "fuzzer_pid" => stats.fuzzer_pid = int(value)?,
        "start_time" => stats.start_time = int(value)?,
        "last_update" => stats.last_update = int(value)?,
        "run_time" => stats.run_time = count(value)?,
        "execs_done" => stats.execs_done = count(value)?,
        "execs_per_sec" => stats.execs_per_sec = float(value)?,
        "execs_ps_last_min" => stats.execs_ps_last_min = float(value)?,

        "corpus_count" | "paths_total" => stats.corpus_count = count(value)?,
        "corpus_favored" | "paths_favored" => stats.corpus_favored = count(value)?,
        "corpus_found" | "paths_found" => stats.corpus_found = count(value)?,
        "pending_total" => stats.pending_total = count(value)?,
        "pending_favs" => stats.pending_favs = count(value)?,
        "cur_item" | "cur_path" => stats.cur_item = count(value)?,
        "max_depth" => stats.max_depth = count(value)?,

        "bitmap_cvg" => stats.bitmap_cvg = float(value)?,
        "edges_found" => stats.edges_found = count(value)?,
        "total_edges" => stats.total_edges = count(value)?,
        "stability" => stats.stability = float(value)?,

        "last_find" | "last_path" => stats.last_find = int(value)?,
        "last_crash" => stats.last_crash = int(value)?,
        "last_hang" => stats.last_hang = int(value)?,

        "cycles_done" => stats.cycles_done = count(value)?,
        "cycles_wo_finds" => stats.cycles_wo_finds = int(value)?,

        "saved_crashes" | "unique_crashes" => stats.saved_crashes = count(value)?,
        "saved_hangs" | "unique_hangs" => stats.saved_hangs = count(value)?,
        "total_tmout" => stats.total_tmout = count(value)?,

        "exec_timeout" => stats.exec_timeout = count(value)?,
        "peak_rss_mb" => stats.peak_rss_mb = count(value)?,
        "afl_banner" => stats.afl_banner = value.to_string(),
        "afl_version" => stats.afl_version = value.to_string(),
        "command_line" => stats.command_line = value.to_string(),
        _ => {}
    }
    Ok(())
}

pub(crate) fn strip_unit(value: &str) -> &str {
    value.trim().trim_end_matches('%').trim_end()
}

pub(crate) fn float(value: &str) -> Result<f64, &'static str> {
    let value: f64 = strip_unit(value).parse().map_err(|_| "not a number")?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("not a finite number")
    }
}

pub(crate) fn int(value: &str) -> Result<i64, &'static str> {
    let value = strip_unit(value);
    match value.parse::<i64>() {
        Ok(v) => Ok(v),
        Err(_) => float(value).map(|v| v as i64),
    }
}

pub(crate) fn count(value: &str) -> Result<u64, &'static str> {
    let value = int(value)?;
    u64::try_from(value).map_err(|_| "negative counter")
}

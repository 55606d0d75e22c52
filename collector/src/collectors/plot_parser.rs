//! Parser for the `plot_data` time series AFL appends to while fuzzing.
//!
//! Only trend-rendering consumers read this; the refresh cycle itself never does.

use super::stats_parser::{
    count,
    float,
};
use crate::metrics::PlotPoint;
use std::path::Path;

pub const PLOT_FILE: &str = "plot_data";

/// Rows with fewer columns than this predate every supported AFL release.
const MIN_COLUMNS: usize = 11;

/// Reads `path` and returns at most `max_points` rows. A missing or
/// unreadable file yields an empty series.
pub async fn parse_plot_file(path: &Path, max_points: usize) -> Vec<PlotPoint> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_plot_data(&content, max_points),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot read plot data");
            Vec::new()
        }
    }
}

pub fn parse_plot_data(content: &str, max_points: usize) -> Vec<PlotPoint> {
    let points = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match parse_row(line) {
            Ok(point) => Some(point),
            Err(reason) => {
                trace!(line, reason, "Skipping malformed plot row");
                None
            }
        })
        .collect();
    downsample(points, max_points)
}

fn parse_row(line: &str) -> Result<PlotPoint, &'static str> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() < MIN_COLUMNS {
        return Err("too few columns");
    }
    let col = |idx: usize| columns.get(idx).copied().unwrap_or("0");

    Ok(PlotPoint {
        relative_time: count(col(0))?,
        cycles_done: count(col(1))?,
        cur_item: count(col(2))?,
        corpus_count: count(col(3))?,
        pending_total: count(col(4))?,
        pending_favs: count(col(5))?,
        map_size: float(col(6))?,
        saved_crashes: count(col(7))?,
        saved_hangs: count(col(8))?,
        max_depth: count(col(9))?,
        execs_per_sec: float(col(10))?,
        total_execs: count(col(11))?,
        edges_found: count(col(12))?,
        total_crashes: count(col(13))?,
        servers_count: count(col(14))?,
    })
}

/// Thins the series with a fixed stride. The newest row is always kept.
fn downsample(points: Vec<PlotPoint>, max_points: usize) -> Vec<PlotPoint> {
    if points.len() <= max_points {
        return points;
    }
    if max_points == 0 {
        return Vec::new();
    }

    let step = points.len().div_ceil(max_points);
    let last = points.len() - 1;
    let mut sampled: Vec<PlotPoint> = points
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| idx % step == 0 || *idx == last)
        .map(|(_, point)| point)
        .collect();

    if sampled.len() > max_points {
        if let Some(newest) = sampled.pop() {
            sampled.pop();
            sampled.push(newest);
        }
    }
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "# relative_time, cycles_done, cur_item, corpus_count, pending_total, pending_favs, map_size, \
                          saved_crashes, saved_hangs, max_depth, execs_per_sec, total_execs, edges_found, \
                          total_crashes, servers_count\n";

    fn rows(n: u64) -> String {
        let mut content = HEADER.to_string();
        for i in 0..n {
            content.push_str(&format!(
                "{}, 1, {i}, {}, 10, 2, {:.2}%, 0, 0, 3, 500.00, {}, {}, 0, 4\n",
                i * 60,
                50 + i,
                5.0 + i as f64 * 0.25,
                i * 1000,
                1000 + i
            ));
        }
        content
    }

    #[test]
    fn parses_rows_and_strips_percent() {
        let points = parse_plot_data(&rows(3), 100);
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].relative_time, 60);
        assert_eq!(points[1].map_size, 5.25);
        assert_eq!(points[2].total_execs, 2000);
        assert_eq!(points[2].servers_count, 4);
    }

    #[test]
    fn caps_rows_and_keeps_newest() {
        let points = parse_plot_data(&rows(100), 10);
        assert_eq!(points.len(), 10);
        assert_eq!(points.first().unwrap().relative_time, 0);
        assert_eq!(points.last().unwrap().relative_time, 99 * 60);
    }

    #[test]
    fn skips_malformed_rows() {
        let content = format!("{HEADER}0, 0, 0, 1, 1, 1, 1.00%, 0, 0, 1, 10.0, 5, 1, 0, 1\nbroken,row\n60, x, 0, 1, 1, 1, 1.00%, 0, 0, 1, 10.0, 5, 1, 0, 1\n");
        let points = parse_plot_data(&content, 100);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn short_legacy_rows_default_missing_columns() {
        let points = parse_plot_data("1600000000, 2, 3, 40, 5, 6, 7.50%, 1, 0, 4, 250.5\n", 100);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].execs_per_sec, 250.5);
        assert_eq!(points[0].total_execs, 0);
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let root = temp_dir::TempDir::new().unwrap();
        assert!(parse_plot_file(&root.child(PLOT_FILE), 10).await.is_empty());
    }
}

use super::format::{
    format_duration,
    format_number,
    format_percent,
    format_speed,
    format_time_ago,
};
use afl_monitor_collector::{
    instance_warnings,
    BoxFuture,
    CampaignSummary,
    Consumer,
    InstanceStats,
    InstanceStatus,
    Snapshot,
    SystemInfo,
};
use afl_monitor_config::Config;
use chrono::Local;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use eyre::Result;
use std::time::Duration;

const WIDTH: usize = 80;

/// Prints a campaign summary table and, unless minimal, one row per fuzzer.
pub struct TableReport {
    no_color: bool,
    minimal: bool,
    verbose: bool,
    /// Refresh interval when running in watch mode.
    watch: Option<Duration>,
}

impl TableReport {
    pub fn new(config: &Config) -> Self {
        Self {
            no_color: config.no_color,
            minimal: config.minimal,
            verbose: config.verbose,
            watch: config.watch.then(|| config.interval()),
        }
    }

    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut report = String::new();

        if self.watch.is_some() && !self.no_color {
            // Clear the screen and move the cursor home.
            report.push_str("\x1B[2J\x1B[1;1H");
        }

        report.push_str(&format!("\n{}\n", "=".repeat(WIDTH)));
        report.push_str(&format!("{:^WIDTH$}\n", "AFL MONITOR"));
        report.push_str(&format!("{}\n", "=".repeat(WIDTH)));
        report.push_str(&format!(
            "\nFindings directory: {}\nUpdated: {}\n\n",
            snapshot.findings_dir.display(),
            snapshot.collected_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));

        if snapshot.instances.is_empty() {
            report.push_str("No fuzzers found.\n");
        }

        let now = snapshot.collected_at.timestamp();
        report.push_str(&format!(
            "{}\n",
            self.summary_table(&snapshot.summary, snapshot.system.as_ref(), now)
        ));

        if !self.minimal && !snapshot.instances.is_empty() {
            let instances = snapshot.sorted_instances();
            report.push_str(&format!("\n{}\n", self.instance_table(&instances, now)));
            if self.verbose {
                report.push_str(&warnings_section(&instances));
            }
        }

        if let Some(interval) = self.watch {
            report.push_str(&format!(
                "\n[Refreshing every {}. Press Ctrl+C to exit]\n",
                humantime::format_duration(interval)
            ));
        }

        report
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if self.no_color {
            table.force_no_tty();
        }
        table
    }

    fn summary_table(&self, summary: &CampaignSummary, system: Option<&SystemInfo>, now: i64) -> Table {
        let mut table = self.table();
        table.set_header(vec![
            Cell::new("Campaign").add_attribute(Attribute::Bold),
            Cell::new("").add_attribute(Attribute::Bold),
        ]);

        let fuzzers_color = if summary.alive_fuzzers > 0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new("Fuzzers"),
            Cell::new(format!(
                "{} alive, {} dead, {} starting ({} total)",
                summary.alive_fuzzers, summary.dead_fuzzers, summary.starting_fuzzers, summary.total_fuzzers
            ))
            .fg(fuzzers_color),
        ]);
        table.add_row(vec!["Total run time".to_string(), format_duration(summary.total_runtime)]);
        table.add_row(vec!["Total execs".to_string(), format_number(summary.total_execs)]);
        table.add_row(vec!["Cumulative speed".to_string(), format_speed(summary.total_speed)]);
        table.add_row(vec!["Speed per core".to_string(), format_speed(summary.avg_speed_per_core)]);
        if summary.current_avg_speed > 0.0 {
            table.add_row(vec!["Speed, last minute".to_string(), format_speed(summary.current_avg_speed)]);
        }
        table.add_row(vec![
            "Corpus".to_string(),
            format!(
                "{} ({} pending, {} pending favored)",
                format_number(summary.total_corpus),
                format_number(summary.total_pending),
                format_number(summary.total_pending_favs)
            ),
        ]);
        table.add_row(vec!["Max coverage".to_string(), format_percent(summary.max_coverage)]);
        if summary.max_total_edges > 0 {
            table.add_row(vec![
                "Edges".to_string(),
                format!(
                    "{} found, map size {}",
                    format_number(summary.total_edges_found),
                    format_number(summary.max_total_edges)
                ),
            ]);
        }
        let stability = if summary.avg_stability > 0.0 {
            format!(
                "{} (min {}, max {})",
                format_percent(summary.avg_stability),
                format_percent(summary.min_stability),
                format_percent(summary.max_stability)
            )
        } else {
            "N/A".to_string()
        };
        table.add_row(vec!["Stability".to_string(), stability]);

        table.add_row(vec![
            Cell::new("Crashes"),
            findings_cell(summary.total_crashes, summary.new_crashes, Color::Red),
        ]);
        table.add_row(vec![
            Cell::new("Hangs"),
            findings_cell(summary.total_hangs, summary.new_hangs, Color::Yellow),
        ]);
        table.add_row(vec!["Last find".to_string(), format_time_ago(summary.last_find_time, now)]);
        table.add_row(vec!["Last crash".to_string(), format_time_ago(summary.last_crash_time, now)]);
        table.add_row(vec!["Last hang".to_string(), format_time_ago(summary.last_hang_time, now)]);
        table.add_row(vec![
            "Cycles".to_string(),
            format!("max {}, avg {:.1}", summary.max_cycle, summary.avg_cycle),
        ]);
        table.add_row(vec!["Cycles without finds".to_string(), summary.cycles_wo_finds.clone()]);
        table.add_row(vec![
            "Fuzzer CPU / memory".to_string(),
            format!("{:.1}% / {:.1}%", summary.total_cpu_usage, summary.total_memory_usage),
        ]);

        if let Some(system) = system {
            table.add_row(vec![
                "Host CPU".to_string(),
                format!("{} cores, {:.1}% busy", system.cpu_count, system.cpu_percent),
            ]);
            table.add_row(vec![
                "Host memory".to_string(),
                format!(
                    "{:.1} / {:.1} GB ({:.1}%)",
                    system.memory_used_gb(),
                    system.memory_total_gb(),
                    system.memory_percent()
                ),
            ]);
            table.add_row(vec![
                "Host disk".to_string(),
                format!(
                    "{:.1} / {:.1} GB ({:.1}%)",
                    system.disk_used_gb(),
                    system.disk_total_gb(),
                    system.disk_percent()
                ),
            ]);
        }

        table
    }

    fn instance_table(&self, instances: &[&InstanceStats], now: i64) -> Table {
        let mut table = self.table();
        table.set_header(
            [
                "Fuzzer",
                "Status",
                "Speed",
                "Execs",
                "Corpus",
                "Pending",
                "Coverage",
                "Stability",
                "Crashes",
                "Hangs",
                "Last find",
                "CPU",
                "Mem",
            ]
            .into_iter()
            .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
        );

        for stats in instances {
            let stability = if stats.has_stability() {
                format_percent(stats.stability)
            } else {
                "N/A".to_string()
            };
            table.add_row(vec![
                Cell::new(&stats.name),
                Cell::new(stats.status).fg(status_color(stats.status)),
                Cell::new(format!("{:.1}/s", stats.execs_per_sec)),
                Cell::new(format_number(stats.execs_done)),
                Cell::new(format_number(stats.corpus_count)),
                Cell::new(format!("{} ({})", stats.pending_total, stats.pending_favs)),
                Cell::new(format_percent(stats.bitmap_cvg)),
                Cell::new(stability),
                Cell::new(stats.saved_crashes),
                Cell::new(stats.saved_hangs),
                Cell::new(format_time_ago(stats.last_find, now)),
                Cell::new(usage(stats.cpu_usage)),
                Cell::new(usage(stats.memory_usage)),
            ]);
        }

        table
    }
}

impl Consumer for TableReport {
    fn consume<'a>(&'a mut self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            println!("{}", self.render(snapshot));
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

fn findings_cell(total: u64, new: u64, highlight: Color) -> Cell {
    if new > 0 {
        Cell::new(format!("{} (+{new} new)", format_number(total)))
            .fg(highlight)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(format_number(total))
    }
}

fn status_color(status: InstanceStatus) -> Color {
    match status {
        InstanceStatus::Alive => Color::Green,
        InstanceStatus::Dead => Color::Red,
        InstanceStatus::Starting => Color::Yellow,
        InstanceStatus::Unknown => Color::White,
    }
}

fn usage(percent: f64) -> String {
    if percent < 0.0 {
        "n/a".to_string()
    } else {
        format!("{percent:.1}%")
    }
}

fn warnings_section(instances: &[&InstanceStats]) -> String {
    let mut section = String::new();
    for stats in instances {
        let warnings = instance_warnings(stats);
        if warnings.is_empty() {
            continue;
        }
        section.push_str(&format!("\n{}:\n", stats.name));
        for warning in warnings {
            section.push_str(&format!("  - {warning}\n"));
        }
    }
    if section.is_empty() {
        section
    } else {
        format!("\nWarnings\n{section}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afl_monitor_collector::{
        aggregate,
        USAGE_INACCESSIBLE,
    };

    fn report(minimal: bool, verbose: bool) -> TableReport {
        TableReport {
            no_color: true,
            minimal,
            verbose,
            watch: None,
        }
    }

    fn snapshot() -> Snapshot {
        let mut fast = InstanceStats::new("fast", "/sync/fast");
        fast.status = InstanceStatus::Alive;
        fast.execs_done = 2_000_000;
        fast.execs_per_sec = 2_500.0;
        fast.saved_crashes = 2;
        fast.cpu_usage = 99.5;

        let mut slow = InstanceStats::new("slow", "/sync/slow");
        slow.status = InstanceStatus::Dead;
        slow.execs_done = 1_000;
        slow.execs_per_sec = 10.0;
        slow.cpu_usage = USAGE_INACCESSIBLE;

        let instances = vec![slow, fast];
        let summary = aggregate(&instances, None);
        Snapshot::new("/sync".into(), instances, summary)
    }

    #[test]
    fn full_report_lists_every_fuzzer() {
        let rendered = report(false, false).render(&snapshot());
        assert!(rendered.contains("Findings directory: /sync"));
        assert!(rendered.contains("2,001,000"));
        assert!(rendered.contains("2,500.00 execs/sec"));
        assert!(rendered.contains("fast"));
        assert!(rendered.contains("slow"));
        assert!(rendered.contains("dead"));
        assert!(rendered.contains("n/a"));
        assert!(!rendered.contains("Warnings"));
        assert!(!rendered.contains('\x1B'));
    }

    #[test]
    fn minimal_report_omits_fuzzers() {
        let rendered = report(true, true).render(&snapshot());
        assert!(rendered.contains("Total execs"));
        assert!(!rendered.contains("slow"));
    }

    #[test]
    fn verbose_report_lists_warnings() {
        let rendered = report(false, true).render(&snapshot());
        assert!(rendered.contains("Warnings"));
        assert!(rendered.contains("Slow execution: 10.0 execs/sec"));
    }

    #[test]
    fn empty_campaign() {
        let snapshot = Snapshot::new("/sync".into(), Vec::new(), CampaignSummary::default());
        let rendered = report(false, false).render(&snapshot);
        assert!(rendered.contains("No fuzzers found."));
        assert!(rendered.contains("never"));
    }

    #[test]
    fn watch_mode_shows_refresh_interval() {
        let report = TableReport {
            watch: Some(Duration::from_secs(10)),
            ..report(false, false)
        };
        let rendered = report.render(&snapshot());
        assert!(rendered.contains("[Refreshing every 10s. Press Ctrl+C to exit]"));
    }
}

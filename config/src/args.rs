use clap::Parser;
use std::path::PathBuf;

/// Monitoring and reporting for AFL/AFL++ fuzzing campaigns.
///
/// FINDINGS_DIRECTORY is the AFL sync directory holding one subdirectory per
/// fuzzer instance.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// AFL sync directory. Falls back to `findings_dir` from the config file.
    #[clap(value_name = "FINDINGS_DIRECTORY")]
    pub findings_dir: Option<PathBuf>,

    /// Print the report to the terminal (default when no other output is selected).
    #[clap(short = 'c', long, action)]
    pub terminal: bool,

    /// Write the snapshot as JSON to FILE.
    #[clap(short = 'j', long = "json", value_name = "FILE")]
    pub json_file: Option<PathBuf>,

    /// Show per-fuzzer details and warnings, log at debug level.
    #[clap(short, long, action)]
    pub verbose: bool,

    /// Disable colored output.
    #[clap(short, long, action)]
    pub no_color: bool,

    /// Refresh until interrupted.
    #[clap(short, long, action)]
    pub watch: bool,

    /// Refresh interval of watch mode in seconds.
    #[clap(short, long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Include dead fuzzers in the output.
    #[clap(short = 'd', long, action)]
    pub show_dead: bool,

    /// Only print the campaign summary.
    #[clap(short, long, action)]
    pub minimal: bool,

    /// Run COMMAND through `sh -c` on new crashes, with a summary on stdin.
    #[clap(short = 'e', long = "execute", value_name = "COMMAND")]
    pub execute_command: Option<String>,

    /// Where the summary of the previous run is kept.
    #[clap(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Upper bound on fuzzer instances collected concurrently.
    #[clap(long, value_name = "N")]
    pub max_workers: Option<usize>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(findings_dir) = &self.findings_dir {
                cache.insert("findings_dir".to_string(), findings_dir.display().to_string().into());
            }
            if let Some(json_file) = &self.json_file {
                cache.insert("json_file".to_string(), json_file.display().to_string().into());
            }
            if let Some(interval) = self.interval {
                cache.insert("interval_secs".to_string(), interval.into());
            }
            if let Some(command) = &self.execute_command {
                cache.insert("execute_command".to_string(), command.clone().into());
            }
            if let Some(state_file) = &self.state_file {
                cache.insert("state_file".to_string(), state_file.display().to_string().into());
            }
            if let Some(max_workers) = self.max_workers {
                cache.insert("collector.max_workers".to_string(), (max_workers as u64).into());
            }

            // Flags only ever switch an option on.
            for (key, set) in [
                ("terminal", self.terminal),
                ("verbose", self.verbose),
                ("no_color", self.no_color),
                ("watch", self.watch),
                ("show_dead", self.show_dead),
                ("minimal", self.minimal),
            ] {
                if set {
                    cache.insert(key.to_string(), true.into());
                }
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let version = clap::crate_version!();
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Source as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_short_flags() {
        let args =
            Args::try_parse_from(["afl-monitor", "-c", "-v", "-w", "-i", "10", "-d", "-e", "./notify.sh", "/sync"])
                .unwrap();
        assert!(args.terminal);
        assert!(args.verbose);
        assert!(args.watch);
        assert!(args.show_dead);
        assert_eq!(args.interval, Some(10));
        assert_eq!(args.execute_command.as_deref(), Some("./notify.sh"));
        assert_eq!(args.findings_dir, Some(PathBuf::from("/sync")));
    }

    #[test]
    fn unset_options_are_not_collected() {
        let collected = Args::default().collect().unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn set_options_are_collected() {
        let args = Args {
            findings_dir: Some(PathBuf::from("/sync")),
            minimal: true,
            max_workers: Some(4),
            ..Default::default()
        };
        let mut keys: Vec<_> = args.collect().unwrap().into_keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["collector.max_workers", "findings_dir", "minimal"]);
    }
}

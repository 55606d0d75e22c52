#[macro_use]
extern crate tracing;

mod app_config;
mod args;

pub use app_config::{
    get_config_dir,
    get_data_dir,
    AppConfig,
};
pub use args::Args;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");
const CONFIG_FILE: &str = "config.yaml";
const STATE_FILE: &str = "state.json";

/// Every option of one `afl-monitor` run, immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub app_config: AppConfig,
    #[serde(default)]
    pub findings_dir: PathBuf,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_file: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub no_color: bool,
    #[serde(default)]
    pub watch: bool,
    pub interval_secs: u64,
    #[serde(default)]
    pub show_dead: bool,
    #[serde(default)]
    pub minimal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub collector: CollectorSettings,
}

/// Tuning of the collection engine, the `collector` table of the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    pub max_workers: usize,
    pub probe_timeout_ms: u64,
    pub startup_grace_secs: u64,
    pub dir_lookup_timeout_ms: u64,
    pub plot_max_points: usize,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_workers: 10,
            probe_timeout_ms: 5_000,
            startup_grace_secs: 60,
            dir_lookup_timeout_ms: 2_000,
            plot_max_points: 1_000,
        }
    }
}

impl CollectorSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn startup_grace(&self) -> Duration {
        Duration::from_secs(self.startup_grace_secs)
    }

    pub fn dir_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.dir_lookup_timeout_ms)
    }
}

impl Config {
    /// Layers the built-in defaults, `config.yaml` of the config directory and `args`.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir(), args)
    }

    fn load(config_dir: &Path, data_dir: &Path, args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.display().to_string())?
            .set_default("config_dir", config_dir.display().to_string())?;

        builder = builder.add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [(CONFIG_FILE, config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let path = config_dir.join(file);
            debug!(path = %path.display(), exists = path.exists(), "Config file");
            let source = config::File::from(path).format(*format).required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.findings_dir.as_os_str().is_empty() {
            return Err(config::ConfigError::Message(
                "missing findings directory, pass FINDINGS_DIRECTORY or set `findings_dir`".to_string(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "`interval_secs` must be at least 1".to_string(),
            ));
        }
        if self.collector.max_workers == 0 {
            return Err(config::ConfigError::Message(
                "`collector.max_workers` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// The configured state file or `state.json` in the data directory.
    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.app_config.data_dir.join(STATE_FILE))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The terminal report is printed when asked for or when nothing else is written.
    pub fn terminal_output(&self) -> bool {
        self.terminal || self.json_file.is_none()
    }
}

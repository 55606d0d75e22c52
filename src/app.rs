use crate::output::{
    CrashNotifier,
    JsonExport,
    TableReport,
};
use afl_monitor_collector::{
    CollectorConfig,
    FileStateStore,
    Monitor,
    OsProbe,
    ProbeSettings,
};
use afl_monitor_config::Config;
use color_eyre::Result;
use eyre::Context as _;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct App {
    config: Config,
    monitor: Monitor,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let collector_config = collector_config(&config);
        let probe = OsProbe::new(collector_config.probe.clone());
        let store = FileStateStore::new(config.state_file());
        debug!(state_file = %store.path().display(), "Using state file");

        let mut monitor = Monitor::new(collector_config, Arc::new(probe), Box::new(store));
        if config.terminal_output() {
            monitor.add_consumer(Box::new(TableReport::new(&config)));
        }
        if let Some(path) = &config.json_file {
            monitor.add_consumer(Box::new(JsonExport::new(path)));
        }
        if let Some(command) = &config.execute_command {
            monitor.add_consumer(Box::new(CrashNotifier::new(command)));
        }

        Ok(Self { config, monitor })
    }

    /// One refresh, or refreshes every interval until Ctrl-C in watch mode.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            findings_dir = %self.config.findings_dir.display(),
            watch = self.config.watch,
            "Starting afl-monitor"
        );

        if !self.config.watch {
            self.monitor.refresh().await.wrap_err("Failed to collect campaign statistics")?;
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let signal = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => cancel.cancel(),
                    Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
                }
            }
        });

        let result = self.watch(&cancel).await;
        signal.abort();
        result
    }

    async fn watch(&mut self, cancel: &CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            // Dropping an unfinished cycle persists nothing.
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.monitor.refresh() => {
                    result.wrap_err("Failed to collect campaign statistics")?;
                }
            }
        }

        info!("Interrupted, exiting");
        Ok(())
    }
}

/// Engine settings derived from the application config.
pub(crate) fn collector_config(config: &Config) -> CollectorConfig {
    let settings = &config.collector;
    let probe = ProbeSettings {
        probe_timeout: settings.probe_timeout(),
        startup_grace: settings.startup_grace(),
        dir_lookup_timeout: settings.dir_lookup_timeout(),
        ..Default::default()
    };
    CollectorConfig::new(&config.findings_dir)
        .with_show_dead(config.show_dead)
        .with_max_workers(settings.max_workers)
        .with_plot_max_points(settings.plot_max_points)
        .with_probe(probe)
}

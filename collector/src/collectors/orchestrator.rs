use crate::{
    collectors::{
        aggregator::aggregate,
        discovery::discover_instances,
        liveness::LivenessProbe,
        plot_parser::{
            parse_plot_file,
            PLOT_FILE,
        },
        scheduler::CollectionScheduler,
        system::collect_system_info,
        warnings::{
            instance_warnings,
            InstanceWarning,
        },
        Consumer,
    },
    config::CollectorConfig,
    metrics::*,
    state::StateStore,
    Error,
};
use std::sync::Arc;

/// Runs refresh cycles over one findings directory and feeds the registered consumers.
pub struct Monitor {
    config: CollectorConfig,
    scheduler: CollectionScheduler,
    store: Box<dyn StateStore>,
    consumers: Vec<Box<dyn Consumer>>,
    sample_system: bool,
}

impl Monitor {
    pub fn new(config: CollectorConfig, probe: Arc<dyn LivenessProbe>, store: Box<dyn StateStore>) -> Self {
        let scheduler = CollectionScheduler::new(probe, &config);
        Self {
            config,
            scheduler,
            store,
            consumers: Vec::new(),
            sample_system: true,
        }
    }

    /// Enables or disables the host resource sample attached to each snapshot.
    pub fn with_system_info(mut self, enabled: bool) -> Self {
        self.sample_system = enabled;
        self
    }

    pub fn add_consumer(&mut self, consumer: Box<dyn Consumer>) {
        debug!(consumer = consumer.name(), "Registered consumer");
        self.consumers.push(consumer);
    }

    /// One cycle: load history, discover, collect, aggregate, persist.
    ///
    /// Only a missing findings directory is an error. Nothing is persisted if
    /// the returned future is dropped before completion.
    #[instrument(level = "debug", skip(self), fields(findings_dir = %self.config.findings_dir.display()))]
    pub async fn collect(&self) -> Result<Snapshot, Error> {
        let previous = self.store.load();

        let dirs = discover_instances(&self.config.findings_dir).await?;
        if dirs.is_empty() {
            warn!(findings_dir = %self.config.findings_dir.display(), "No fuzzers found");
        }

        let instances = self.scheduler.collect(dirs).await;
        let summary = aggregate(&instances, previous.as_ref());
        let system = if self.sample_system {
            collect_system_info().await
        } else {
            None
        };

        self.store.save(&summary);

        debug!(
            total = summary.total_fuzzers,
            alive = summary.alive_fuzzers,
            new_crashes = summary.new_crashes,
            "Refresh cycle complete"
        );
        Ok(Snapshot::new(self.config.findings_dir.clone(), instances, summary).with_system(system))
    }

    /// Runs [`Monitor::collect`] and hands the snapshot to every consumer.
    pub async fn refresh(&mut self) -> Result<Snapshot, Error> {
        let snapshot = self.collect().await?;
        for consumer in self.consumers.iter_mut() {
            if let Err(e) = consumer.consume(&snapshot).await {
                error!(consumer = consumer.name(), error = ?e, "Consumer failed");
            }
        }
        Ok(snapshot)
    }

    /// Time series of one instance, capped at the configured number of points.
    pub async fn plot_data(&self, instance: &str) -> Vec<PlotPoint> {
        let path = self.config.findings_dir.join(instance).join(PLOT_FILE);
        parse_plot_file(&path, self.config.plot_max_points).await
    }

    pub fn warnings(&self, instance: &InstanceStats) -> Vec<InstanceWarning> {
        instance_warnings(instance)
    }
}

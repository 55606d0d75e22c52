use super::{
    liveness::{
        LivenessProbe,
        ProbeVerdict,
    },
    stats_parser::{
        parse_stats_file,
        STATS_FILE,
    },
};
use crate::{
    config::CollectorConfig,
    metrics::InstanceStats,
};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::Semaphore,
    task::JoinSet,
};

/// Fans out parse + probe over a bounded pool of tasks and gathers the results.
pub struct CollectionScheduler {
    probe: Arc<dyn LivenessProbe>,
    max_workers: usize,
    probe_timeout: Duration,
    show_dead: bool,
}

impl CollectionScheduler {
    pub fn new(probe: Arc<dyn LivenessProbe>, config: &CollectorConfig) -> Self {
        Self {
            probe,
            max_workers: config.max_workers.max(1),
            probe_timeout: config.probe.probe_timeout,
            show_dead: config.show_dead,
        }
    }

    /// Collects every instance in `dirs`. The result is in completion order and
    /// only holds alive instances unless dead ones were asked for.
    #[instrument(level = "debug", skip_all, fields(instances = dirs.len(), probe = self.probe.name()))]
    pub async fn collect(&self, dirs: Vec<PathBuf>) -> Vec<InstanceStats> {
        let collected = match <[PathBuf; 1]>::try_from(dirs) {
            Ok([dir]) => collect_instance(dir, self.probe.clone(), self.probe_timeout)
                .await
                .into_iter()
                .collect(),
            Err(dirs) if dirs.is_empty() => Vec::new(),
            Err(dirs) => self.collect_pooled(dirs).await,
        };

        collected
            .into_iter()
            .filter(|stats| stats.is_alive() || self.show_dead)
            .collect()
    }

    async fn collect_pooled(&self, dirs: Vec<PathBuf>) -> Vec<InstanceStats> {
        let workers = dirs.len().min(self.max_workers);
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut task_dirs = HashMap::new();

        for dir in dirs {
            let permits = permits.clone();
            let probe = self.probe.clone();
            let timeout = self.probe_timeout;
            let task_dir = dir.clone();
            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                collect_instance(task_dir, probe, timeout).await
            });
            task_dirs.insert(handle.id(), dir);
        }

        let mut results = Vec::with_capacity(task_dirs.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Some(stats))) => results.push(stats),
                Ok((_, None)) => {}
                Err(e) => {
                    let dir = task_dirs.get(&e.id()).map(|d| d.display().to_string());
                    error!(dir = ?dir, error = %e, "Error collecting instance");
                }
            }
        }
        debug!(workers, collected = results.len(), "Pooled collection finished");
        results
    }
}

async fn collect_instance(dir: PathBuf, probe: Arc<dyn LivenessProbe>, timeout: Duration) -> Option<InstanceStats> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());

    let mut stats = parse_stats_file(&dir.join(STATS_FILE), &name).await?;

    let verdict = match tokio::time::timeout(timeout, probe.probe(stats.fuzzer_pid, &dir)).await {
        Ok(verdict) => verdict,
        Err(_) => {
            warn!(instance = %name, pid = stats.fuzzer_pid, ?timeout, "Liveness probe timed out");
            ProbeVerdict::unknown()
        }
    };

    stats.status = verdict.status;
    stats.cpu_usage = verdict.cpu_usage;
    stats.memory_usage = verdict.memory_usage;
    trace!(instance = %name, status = %stats.status, "Collected instance");
    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collectors::liveness::StaticProbe,
        metrics::InstanceStatus,
    };
    use temp_dir::TempDir;

    fn instance(root: &TempDir, name: &str, pid: i64, execs: u64) -> PathBuf {
        let dir = root.child(name);
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join(STATS_FILE),
            format!("fuzzer_pid : {pid}\nexecs_done : {execs}\nexecs_per_sec : 10.0\n"),
        )
        .unwrap();
        dir
    }

    fn probe() -> Arc<dyn LivenessProbe> {
        Arc::new(
            StaticProbe::new()
                .with_verdict(1, ProbeVerdict::alive(90.0, 2.0))
                .with_verdict(2, ProbeVerdict::alive(80.0, 3.0)),
        )
    }

    fn sorted_names(stats: &[InstanceStats]) -> Vec<String> {
        let mut names: Vec<_> = stats.iter().map(|s| s.name.clone()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn dead_instances_are_hidden_by_default() {
        let root = TempDir::new().unwrap();
        let dirs = vec![
            instance(&root, "a", 1, 10),
            instance(&root, "b", 2, 20),
            instance(&root, "c", 3, 30),
        ];
        let scheduler = CollectionScheduler::new(probe(), &CollectorConfig::new(root.path()));
        let stats = scheduler.collect(dirs).await;
        assert_eq!(sorted_names(&stats), vec!["a", "b"]);
        assert!(stats.iter().all(|s| s.status == InstanceStatus::Alive));
    }

    #[tokio::test]
    async fn show_dead_keeps_everything() {
        let root = TempDir::new().unwrap();
        let dirs = vec![instance(&root, "a", 1, 10), instance(&root, "c", 3, 30)];
        let config = CollectorConfig::new(root.path()).with_show_dead(true);
        let stats = CollectionScheduler::new(probe(), &config).collect(dirs).await;
        assert_eq!(sorted_names(&stats), vec!["a", "c"]);
        let dead = stats.iter().find(|s| s.name == "c").unwrap();
        assert_eq!(dead.status, InstanceStatus::Dead);
        assert_eq!(dead.cpu_usage, 0.0);
    }

    #[tokio::test]
    async fn directories_without_stats_are_skipped() {
        let root = TempDir::new().unwrap();
        let empty = root.child("empty");
        std::fs::create_dir(&empty).unwrap();
        let dirs = vec![instance(&root, "a", 1, 10), empty];
        let config = CollectorConfig::new(root.path()).with_show_dead(true);
        let stats = CollectionScheduler::new(probe(), &config).collect(dirs).await;
        assert_eq!(sorted_names(&stats), vec!["a"]);
    }

    #[tokio::test]
    async fn single_instance_runs_inline() {
        let root = TempDir::new().unwrap();
        let dirs = vec![instance(&root, "solo", 2, 5)];
        let stats = CollectionScheduler::new(probe(), &CollectorConfig::new(root.path()))
            .collect(dirs)
            .await;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].cpu_usage, 80.0);
        assert_eq!(stats[0].memory_usage, 3.0);
    }

    #[tokio::test]
    async fn pool_smaller_than_instance_count() {
        let root = TempDir::new().unwrap();
        let dirs: Vec<_> = (0..25).map(|i| instance(&root, &format!("s{i:02}"), 1, i)).collect();
        let config = CollectorConfig::new(root.path()).with_max_workers(3);
        let stats = CollectionScheduler::new(probe(), &config).collect(dirs).await;
        assert_eq!(stats.len(), 25);
        assert_eq!(stats.iter().map(|s| s.execs_done).sum::<u64>(), (0..25).sum::<u64>());
    }

    #[tokio::test]
    async fn hung_probe_degrades_to_unknown() {
        let root = TempDir::new().unwrap();
        let dirs = vec![instance(&root, "a", 1, 10), instance(&root, "b", 2, 20)];
        let slow: Arc<dyn LivenessProbe> = Arc::new(
            StaticProbe::new()
                .with_verdict(1, ProbeVerdict::alive(1.0, 1.0))
                .with_delay(Duration::from_secs(30)),
        );
        let mut config = CollectorConfig::new(root.path()).with_show_dead(true);
        config.probe.probe_timeout = Duration::from_millis(50);

        let stats = CollectionScheduler::new(slow, &config).collect(dirs).await;
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.status == InstanceStatus::Unknown));
    }
}

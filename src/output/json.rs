use afl_monitor_collector::{
    BoxFuture,
    Consumer,
    Snapshot,
};
use chrono::Local;
use eyre::{
    Context as _,
    Result,
};
use serde_json::json;
use std::path::PathBuf;

/// Writes every snapshot to a JSON file, replacing the previous one.
pub struct JsonExport {
    path: PathBuf,
}

impl JsonExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn document(snapshot: &Snapshot) -> serde_json::Value {
        json!({
            "metadata": {
                "timestamp": snapshot.collected_at.timestamp(),
                "timestamp_str": snapshot.collected_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
                "monitor_version": env!("CARGO_PKG_VERSION"),
                "findings_directory": snapshot.findings_dir.display().to_string(),
            },
            "summary": snapshot.summary,
            "fuzzers": snapshot.sorted_instances(),
            "system": snapshot.system.as_ref().map_or_else(|| json!({}), |system| json!(system)),
        })
    }
}

impl Consumer for JsonExport {
    fn consume<'a>(&'a mut self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let content =
                serde_json::to_string_pretty(&Self::document(snapshot)).context("Failed to serialize snapshot")?;
            tokio::fs::write(&self.path, content)
                .await
                .wrap_err_with(|| format!("Failed to write JSON output to {:?}", self.path))?;
            info!(path = %self.path.display(), "JSON output written");
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afl_monitor_collector::{
        aggregate,
        InstanceStats,
        InstanceStatus,
        SystemInfo,
    };
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn snapshot() -> Snapshot {
        let mut main = InstanceStats::new("main", "/sync/main");
        main.status = InstanceStatus::Alive;
        main.saved_crashes = 4;
        main.bitmap_cvg = 7.5;
        let mut other = InstanceStats::new("other", "/sync/other");
        other.status = InstanceStatus::Dead;
        let instances = vec![other, main];
        let summary = aggregate(&instances, None);
        Snapshot::new("/sync".into(), instances, summary)
    }

    #[tokio::test]
    async fn writes_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("stats.json");
        let mut export = JsonExport::new(&path);
        export.consume(&snapshot()).await.unwrap();

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["metadata"]["findings_directory"], "/sync");
        assert_eq!(written["metadata"]["monitor_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(written["summary"]["total_crashes"], 4);
        assert_eq!(written["summary"]["max_coverage"], 7.5);
        assert_eq!(written["fuzzers"][0]["name"], "main");
        assert_eq!(written["fuzzers"][1]["status"], "dead");
        assert_eq!(written["system"], json!({}));
    }

    #[test]
    fn includes_system_sample() {
        let system = SystemInfo {
            cpu_count: 8,
            ..Default::default()
        };
        let document = JsonExport::document(&snapshot().with_system(Some(system)));
        assert_eq!(document["system"]["cpu_count"], 8);
    }

    #[tokio::test]
    async fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut export = JsonExport::new(dir.child("missing").join("stats.json"));
        assert!(export.consume(&snapshot()).await.is_err());
    }
}

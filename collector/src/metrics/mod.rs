pub mod campaign_data;
pub mod host_data;
pub mod instance_data;
pub mod series_data;
pub mod shared;

// Re-export the main types for easy access
pub use campaign_data::*;
use chrono::{
    DateTime,
    Utc,
};
pub use host_data::*;
pub use instance_data::*;
use serde::{
    Deserialize,
    Serialize,
};
pub use series_data::*;
pub use shared::*;
use std::path::PathBuf;

/// Result of one refresh cycle. Consumers only ever see it by shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub collected_at: DateTime<Utc>,
    pub findings_dir: PathBuf,
    pub instances: Vec<InstanceStats>,
    pub summary: CampaignSummary,
    pub system: Option<SystemInfo>,
}

impl Snapshot {
    pub fn new(findings_dir: PathBuf, instances: Vec<InstanceStats>, summary: CampaignSummary) -> Self {
        Self {
            collected_at: Utc::now(),
            findings_dir,
            instances,
            summary,
            system: None,
        }
    }

    pub fn with_system(mut self, system: Option<SystemInfo>) -> Self {
        self.system = system;
        self
    }

    /// Instances ordered by name. Collection order is not stable across cycles.
    pub fn sorted_instances(&self) -> Vec<&InstanceStats> {
        let mut instances: Vec<_> = self.instances.iter().collect();
        instances.sort_by(|a, b| a.name.cmp(&b.name));
        instances
    }
}

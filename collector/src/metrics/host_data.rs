use serde::{
    Deserialize,
    Serialize,
};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Host-level resources sampled alongside each snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu_count: usize,
    pub cpu_percent: f64,

    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,

    pub disk_total_bytes: u64,
    pub disk_used_bytes: u64,
}

impl SystemInfo {
    pub fn memory_total_gb(&self) -> f64 {
        self.memory_total_bytes as f64 / GIB
    }

    pub fn memory_used_gb(&self) -> f64 {
        self.memory_used_bytes as f64 / GIB
    }

    pub fn memory_percent(&self) -> f64 {
        percent(self.memory_used_bytes, self.memory_total_bytes)
    }

    pub fn disk_total_gb(&self) -> f64 {
        self.disk_total_bytes as f64 / GIB
    }

    pub fn disk_used_gb(&self) -> f64 {
        self.disk_used_bytes as f64 / GIB
    }

    pub fn disk_percent(&self) -> f64 {
        percent(self.disk_used_bytes, self.disk_total_bytes)
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_handle_zero_totals() {
        let info = SystemInfo::default();
        assert_eq!(info.memory_percent(), 0.0);
        assert_eq!(info.disk_percent(), 0.0);

        let info = SystemInfo {
            memory_total_bytes: 8 * 1024 * 1024 * 1024,
            memory_used_bytes: 2 * 1024 * 1024 * 1024,
            ..Default::default()
        };
        assert_eq!(info.memory_percent(), 25.0);
        assert_eq!(info.memory_total_gb(), 8.0);
    }
}

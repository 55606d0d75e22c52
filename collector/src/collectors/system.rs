use crate::metrics::SystemInfo;
use std::path::Path;
use sysinfo::{
    Disks,
    System,
};

/// Samples host CPU, memory and the disk holding `/`.
///
/// Blocks for the CPU sampling window; call it from a blocking task.
pub fn sample_system_info() -> SystemInfo {
    let mut system = System::new();
    system.refresh_memory();
    system.refresh_cpu();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    system.refresh_cpu();

    let disks = Disks::new_with_refreshed_list();
    let root = disks.list().iter().find(|disk| disk.mount_point() == Path::new("/"));
    let (disk_total_bytes, disk_available) = root
        .map(|disk| (disk.total_space(), disk.available_space()))
        .unwrap_or((0, 0));

    SystemInfo {
        cpu_count: system.cpus().len(),
        cpu_percent: system.global_cpu_info().cpu_usage() as f64,
        memory_total_bytes: system.total_memory(),
        memory_used_bytes: system.used_memory(),
        disk_total_bytes,
        disk_used_bytes: disk_total_bytes.saturating_sub(disk_available),
    }
}

/// [`sample_system_info`] off the async runtime. `None` if the sampling task failed.
pub async fn collect_system_info() -> Option<SystemInfo> {
    match tokio::task::spawn_blocking(sample_system_info).await {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(error = %e, "Failed to sample system information");
            None
        }
    }
}

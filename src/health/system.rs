//! Host Resource Sampling
//!
//! Reads CPU, memory and root-disk usage through sysinfo.

use std::path::Path;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

/// One reading of host resource usage, in percent. `None` when the platform gave no data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSample {
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub disk_usage_percent: Option<f64>,
}

impl SystemSample {
    /// True when every reading is present.
    pub fn is_complete(&self) -> bool {
        self.cpu_usage_percent.is_some()
            && self.memory_usage_percent.is_some()
            && self.disk_usage_percent.is_some()
    }

    /// True when any present reading is above `limit`.
    pub fn exceeds(&self, limit: f64) -> bool {
        [
            self.cpu_usage_percent,
            self.memory_usage_percent,
            self.disk_usage_percent,
        ]
        .into_iter()
        .flatten()
        .any(|percent| percent > limit)
    }
}

/// Samples the host. CPU usage needs two refreshes separated by sysinfo's minimum interval.
pub async fn sample() -> SystemSample {
    let mut sys = System::new_with_specifics(
        RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything()),
    );

    sys.refresh_cpu_all();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_all();

    let cpu_usage_percent = (!sys.cpus().is_empty()).then(|| sys.global_cpu_usage() as f64);

    let total_memory = sys.total_memory();
    let memory_usage_percent =
        (total_memory > 0).then(|| percent(sys.used_memory(), total_memory));

    SystemSample {
        cpu_usage_percent,
        memory_usage_percent,
        disk_usage_percent: root_disk_usage(),
    }
}

/// Usage of the disk mounted at `/`, or of all disks combined when there is no such mount.
fn root_disk_usage() -> Option<f64> {
    let disks = Disks::new_with_refreshed_list();

    let (total, available) = match disks
        .list()
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
    {
        Some(root) => (root.total_space(), root.available_space()),
        None => disks.list().iter().fold((0, 0), |(t, a), disk| {
            (t + disk.total_space(), a + disk.available_space())
        }),
    };

    (total > 0).then(|| percent(total.saturating_sub(available), total))
}

fn percent(used: u64, total: u64) -> f64 {
    used as f64 / total as f64 * 100.0
}

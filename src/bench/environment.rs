//! Host environment facts recorded in the report

use indexmap::IndexMap;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// Description of the machine a benchmark ran on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    /// Operating system, architecture and kernel version
    pub platform: String,

    /// CPU models with the number of logical CPUs of each
    pub cpus: Vec<(String, usize)>,

    pub total_memory_bytes: u64,
}

impl EnvironmentInfo {
    /// Queries the current host
    pub fn detect() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_memory(MemoryRefreshKind::everything())
                .with_cpu(CpuRefreshKind::everything()),
        );

        let platform = match System::kernel_version() {
            Some(kernel) => format!(
                "{} {} {}",
                std::env::consts::OS,
                std::env::consts::ARCH,
                kernel
            ),
            None => format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        };

        let info = Self {
            platform,
            cpus: group_cpu_models(system.cpus().iter().map(|cpu| cpu.brand().trim())),
            total_memory_bytes: system.total_memory(),
        };

        tracing::debug!(
            "Environment: {}, {} CPU models, {}",
            info.platform,
            info.cpus.len(),
            info.memory_summary()
        );

        info
    }

    /// One `"<model> x <count>"` line per CPU model
    pub fn cpu_summary(&self) -> String {
        self.cpus
            .iter()
            .map(|(model, count)| format!("{} x {}", model, count))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total memory in GiB with one decimal, e.g. `"15.5 GB"`
    pub fn memory_summary(&self) -> String {
        format!(
            "{:.1} GB",
            self.total_memory_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
        )
    }
}

/// Counts identical model names, keeping first-seen order
fn group_cpu_models<'a>(models: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for model in models {
        let model = if model.is_empty() { "Unknown CPU" } else { model };
        *counts.entry(model.to_string()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

use crate::domain::model::KeyValues;
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Stats are sampled at most this often, whatever the loop frequency.
#[cfg(feature = "cli")]
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub memory_usage_percent: f32,
}

impl SystemStats {
    /// Key-values published alongside robot data.
    pub fn to_key_values(&self) -> KeyValues {
        let mut values = KeyValues::new();
        values.insert(
            "cpu_load_percentage".to_string(),
            serde_json::json!(self.cpu_usage),
        );
        values.insert(
            "ram_usage_mb".to_string(),
            serde_json::json!(self.memory_usage_mb),
        );
        values.insert(
            "ram_usage_percentage".to_string(),
            serde_json::json!(self.memory_usage_percent),
        );
        values
    }
}

#[cfg(feature = "cli")]
struct Sampler {
    system: System,
    last: Option<(Instant, SystemStats)>,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    sampler: Mutex<Sampler>,
    pid: Option<Pid>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("System stats unavailable: {}", e);
                None
            }
        };

        Self {
            sampler: Mutex::new(Sampler {
                system: System::new(),
                last: None,
            }),
            pid,
            enabled,
        }
    }

    /// Stats for the connector process. Only this process and the memory
    /// totals are refreshed, never the whole process table.
    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let pid = self.pid?;
        let mut sampler = self.sampler.lock().ok()?;
        if let Some((sampled_at, stats)) = &sampler.last {
            if sampled_at.elapsed() < SAMPLE_INTERVAL {
                return Some(stats.clone());
            }
        }

        sampler.system.refresh_memory();
        sampler
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let stats = {
            let process = sampler.system.process(pid)?;
            let memory_mb = process.memory() / 1024 / 1024;
            let total_memory = sampler.system.total_memory() / 1024 / 1024;
            let memory_percent = if total_memory > 0 {
                (memory_mb as f32 / total_memory as f32) * 100.0
            } else {
                0.0
            };
            SystemStats {
                cpu_usage: process.cpu_usage(),
                memory_usage_mb: memory_mb,
                memory_usage_percent: memory_percent,
            }
        };
        sampler.last = Some((Instant::now(), stats.clone()));
        Some(stats)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without sysinfo there is nothing to sample.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        None
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

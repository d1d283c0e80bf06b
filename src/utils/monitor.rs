#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// 單次資源快照
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

/// 工作流程執行期間的資源監控
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
    peak_memory_mb: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Resource monitoring unavailable: {}", e);
                None
            }
        };

        Self {
            system: Mutex::new(System::new_all()),
            pid,
            started: Instant::now(),
            peak_memory_mb: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<ResourceSnapshot> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(ResourceSnapshot {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_snapshot(&self, phase: &str) {
        if let Some(s) = self.snapshot() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                s.cpu_usage,
                s.memory_usage_mb,
                s.peak_memory_mb,
                s.elapsed
            );
        }
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// 非 CLI 建置只記錄經過時間
#[cfg(not(feature = "cli"))]
pub struct RunMonitor {
    started: Instant,
}

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> Option<ResourceSnapshot> {
        Some(ResourceSnapshot {
            cpu_usage: 0.0,
            memory_usage_mb: 0,
            peak_memory_mb: 0,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_snapshot(&self, phase: &str) {
        tracing::info!("📊 {} - Time: {:?}", phase, self.started.elapsed());
    }
}

#[cfg(not(feature = "cli"))]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new()
    }
}

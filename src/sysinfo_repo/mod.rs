// System stats and process control via sysinfo

mod kill;
mod process;

pub use process::{ProcessProbe, ReadError, collect_processes, read_process, status_label};

use crate::models::*;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};
use tracing::instrument;

/// Reads fresh OS state on every call. Holds no sysinfo handles between requests, so
/// concurrent callers never share counters.
#[derive(Debug, Clone)]
pub struct SysinfoRepo {
    sample_interval: Duration,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl SysinfoRepo {
    /// `sample_interval` is raised to sysinfo's minimum CPU refresh interval if shorter.
    pub fn new(sample_interval: Duration) -> Self {
        Self {
            sample_interval: sample_interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Take a full snapshot. Blocks a pool thread for the sampling interval.
    /// Only fails if the blocking task itself cannot be joined.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "collect"))]
    pub async fn collect(&self) -> anyhow::Result<SystemSnapshot> {
        let sample_interval = self.sample_interval;
        tokio::task::spawn_blocking(move || collect_snapshot(sample_interval))
            .await
            .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "terminate"))]
    pub async fn terminate(&self, pid: u32) -> anyhow::Result<KillResult> {
        let result = tokio::task::spawn_blocking(move || kill::kill_process(pid))
            .await
            .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?;
        match &result {
            KillResult::Terminated(pid) => tracing::info!("Sent SIGKILL to PID {}", pid),
            KillResult::NotFound => tracing::debug!("PID {} not found", pid),
            KillResult::Forbidden => tracing::warn!("Permission denied killing PID {}", pid),
            KillResult::Failed(detail) => tracing::warn!("Failed to kill PID {}: {}", pid, detail),
        }
        Ok(result)
    }
}

fn collect_snapshot(sample_interval: Duration) -> SystemSnapshot {
    // Both passes use a fresh System, so per-process CPU is measured over this request's
    // sampling window instead of reading 0.0 on first observation.
    let refresh_kind = ProcessRefreshKind::nothing()
        .with_cpu()
        .with_memory()
        .with_user(UpdateKind::OnlyIfNotSet);
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind);

    // Threads listed as tasks are not processes in their own right.
    let mut enumerated: Vec<u32> = sys
        .processes()
        .iter()
        .filter(|(_, p)| p.thread_kind().is_none())
        .map(|(pid, _)| pid.as_u32())
        .collect();
    enumerated.sort_unstable();

    std::thread::sleep(sample_interval);

    sys.refresh_cpu_usage();
    sys.refresh_memory();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind);
    let users = Users::new_with_refreshed_list();

    let memory_total = sys.total_memory();
    let memory_used = memory_total.saturating_sub(sys.available_memory());

    let reads = enumerated
        .iter()
        .map(|&pid| match sys.process(Pid::from_u32(pid)) {
            Some(p) => read_process(ProcessProbe::read(pid, p, &users), memory_total),
            None => Err(ReadError::Vanished(pid)),
        });
    let (processes, skipped) = collect_processes(reads);
    tracing::debug!(
        "collected {} processes, skipped {}",
        processes.len(),
        skipped
    );

    SystemSnapshot::new(
        f64::from(sys.global_cpu_usage()),
        memory_used,
        memory_total,
        processes,
        unix_timestamp(),
    )
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

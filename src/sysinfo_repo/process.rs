// Per-process read: raw sysinfo fields -> ProcessRecord, or a reason to skip the process.

use sysinfo::{Process, ProcessStatus, Users};

use crate::models::ProcessRecord;

/// Why a process was left out of a snapshot. Never surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("process {0} exited before it could be read")]
    Vanished(u32),
    #[error("process {0} is a zombie")]
    Zombie(u32),
    #[error("process {0} has no readable fields")]
    Unreadable(u32),
}

/// Fields read from the OS for one process, before normalization.
#[derive(Debug, Clone)]
pub struct ProcessProbe {
    pub pid: u32,
    pub name: Option<String>,
    pub status: ProcessStatus,
    pub cpu_usage: f32,
    pub memory_bytes: u64,
    /// Seconds since the Unix epoch; 0 when the OS did not report it.
    pub start_time: u64,
    pub username: Option<String>,
}

impl ProcessProbe {
    pub(super) fn read(pid: u32, process: &Process, users: &Users) -> Self {
        let name = process.name().to_string_lossy();
        Self {
            pid,
            name: (!name.is_empty()).then(|| name.into_owned()),
            status: process.status(),
            cpu_usage: process.cpu_usage(),
            memory_bytes: process.memory(),
            start_time: process.start_time(),
            username: process
                .user_id()
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|user| user.name().to_string()),
        }
    }
}

/// Normalize a probe into the wire record. Zombies and entries with nothing readable are skipped.
pub fn read_process(probe: ProcessProbe, memory_total: u64) -> Result<ProcessRecord, ReadError> {
    if matches!(probe.status, ProcessStatus::Zombie | ProcessStatus::Dead) {
        return Err(ReadError::Zombie(probe.pid));
    }
    if probe.name.is_none() && matches!(probe.status, ProcessStatus::Unknown(_)) {
        return Err(ReadError::Unreadable(probe.pid));
    }

    let cpu_percent = f64::from(probe.cpu_usage);
    let cpu_percent = if cpu_percent.is_finite() && cpu_percent > 0.0 {
        cpu_percent
    } else {
        0.0
    };
    let memory_percent = if memory_total > 0 {
        ((probe.memory_bytes as f64 / memory_total as f64) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Ok(ProcessRecord {
        pid: probe.pid,
        name: probe.name.unwrap_or_default(),
        status: status_label(probe.status),
        cpu_percent,
        memory_percent,
        create_time: (probe.start_time > 0).then_some(probe.start_time as f64),
        username: probe.username.unwrap_or_default(),
    })
}

/// Lowercase state name in the vocabulary dashboards expect ("running", "disk-sleep", ...).
pub fn status_label(status: ProcessStatus) -> String {
    #[allow(unreachable_patterns)]
    let label = match status {
        ProcessStatus::Run => "running",
        ProcessStatus::Sleep => "sleeping",
        ProcessStatus::Idle => "idle",
        ProcessStatus::Stop => "stopped",
        ProcessStatus::Zombie => "zombie",
        ProcessStatus::Tracing => "tracing-stop",
        ProcessStatus::Dead => "dead",
        ProcessStatus::Wakekill => "wake-kill",
        ProcessStatus::Waking => "waking",
        ProcessStatus::Parked => "parked",
        ProcessStatus::LockBlocked => "locked",
        ProcessStatus::UninterruptibleDiskSleep => "disk-sleep",
        ProcessStatus::Unknown(_) => "unknown",
        other => return other.to_string().to_lowercase(),
    };
    label.to_string()
}

/// Keep successful reads, drop the rest, and order by cpu_percent descending.
/// Returns the ordered records and how many reads were skipped.
///
/// Records are first put in pid order (dropping duplicate pids), so processes with equal
/// cpu_percent stay in ascending pid order.
pub fn collect_processes<I>(reads: I) -> (Vec<ProcessRecord>, usize)
where
    I: IntoIterator<Item = Result<ProcessRecord, ReadError>>,
{
    let mut skipped = 0usize;
    let mut records: Vec<ProcessRecord> = reads
        .into_iter()
        .filter_map(|read| match read {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::trace!("skipping process: {}", e);
                skipped += 1;
                None
            }
        })
        .collect();

    records.sort_by_key(|r| r.pid);
    records.dedup_by_key(|r| r.pid);
    // total_cmp orders every f64, so this cannot fail; NaN never reaches here (see read_process).
    records.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn probe(pid: u32) -> ProcessProbe {
        ProcessProbe {
            pid,
            name: Some(format!("proc-{pid}")),
            status: ProcessStatus::Sleep,
            cpu_usage: 0.0,
            memory_bytes: 0,
            start_time: 1_700_000_000,
            username: Some("alice".into()),
        }
    }

    fn record(pid: u32, cpu_percent: f64) -> ProcessRecord {
        let mut p = probe(pid);
        p.cpu_usage = cpu_percent as f32;
        read_process(p, GIB).unwrap()
    }

    #[test]
    fn read_process_normalizes_fields() {
        let mut p = probe(42);
        p.status = ProcessStatus::Run;
        p.cpu_usage = 12.5;
        p.memory_bytes = GIB / 4;
        let r = read_process(p, GIB).unwrap();
        assert_eq!(r.pid, 42);
        assert_eq!(r.name, "proc-42");
        assert_eq!(r.status, "running");
        assert_eq!(r.cpu_percent, 12.5);
        assert!((r.memory_percent - 25.0).abs() < 1e-9);
        assert_eq!(r.create_time, Some(1_700_000_000.0));
        assert_eq!(r.username, "alice");
    }

    #[test]
    fn read_process_defaults_missing_fields() {
        let p = ProcessProbe {
            pid: 7,
            name: None,
            status: ProcessStatus::Sleep,
            cpu_usage: f32::NAN,
            memory_bytes: 0,
            start_time: 0,
            username: None,
        };
        let r = read_process(p, 0).unwrap();
        assert_eq!(r.name, "");
        assert_eq!(r.username, "");
        assert_eq!(r.cpu_percent, 0.0);
        assert_eq!(r.memory_percent, 0.0);
        assert_eq!(r.create_time, None);
    }

    #[test]
    fn read_process_skips_zombies() {
        let mut p = probe(9);
        p.status = ProcessStatus::Zombie;
        assert_eq!(read_process(p, GIB), Err(ReadError::Zombie(9)));

        let mut p = probe(10);
        p.status = ProcessStatus::Dead;
        assert_eq!(read_process(p, GIB), Err(ReadError::Zombie(10)));
    }

    #[test]
    fn read_process_skips_entries_with_nothing_readable() {
        let mut p = probe(11);
        p.name = None;
        p.status = ProcessStatus::Unknown(0);
        assert_eq!(read_process(p, GIB), Err(ReadError::Unreadable(11)));
    }

    #[test]
    fn read_process_clamps_memory_percent() {
        let mut p = probe(12);
        p.memory_bytes = 2 * GIB;
        let r = read_process(p, GIB).unwrap();
        assert_eq!(r.memory_percent, 100.0);
    }

    #[test]
    fn status_label_uses_lowercase_vocabulary() {
        assert_eq!(status_label(ProcessStatus::Run), "running");
        assert_eq!(status_label(ProcessStatus::Sleep), "sleeping");
        assert_eq!(status_label(ProcessStatus::UninterruptibleDiskSleep), "disk-sleep");
        assert_eq!(status_label(ProcessStatus::Tracing), "tracing-stop");
        assert_eq!(status_label(ProcessStatus::Unknown(3)), "unknown");
    }

    #[test]
    fn collect_processes_sorts_by_cpu_descending() {
        let reads = vec![Ok(record(1, 5.0)), Ok(record(2, 50.0)), Ok(record(3, 20.0))];
        let (records, skipped) = collect_processes(reads);
        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![2, 3, 1]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn collect_processes_breaks_ties_by_pid() {
        let reads = vec![Ok(record(30, 0.0)), Ok(record(10, 0.0)), Ok(record(20, 0.0))];
        let (records, _) = collect_processes(reads);
        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
    }

    #[test]
    fn collect_processes_drops_failed_reads_only() {
        let reads = vec![
            Ok(record(1, 1.0)),
            Err(ReadError::Vanished(2)),
            Ok(record(3, 3.0)),
            Err(ReadError::Zombie(4)),
        ];
        let (records, skipped) = collect_processes(reads);
        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![3, 1]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn collect_processes_removes_duplicate_pids() {
        let reads = vec![Ok(record(5, 1.0)), Ok(record(5, 1.0)), Ok(record(6, 2.0))];
        let (records, _) = collect_processes(reads);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn collect_processes_handles_empty_input() {
        let (records, skipped) = collect_processes(Vec::new());
        assert!(records.is_empty());
        assert_eq!(skipped, 0);
    }
}

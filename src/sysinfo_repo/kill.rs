// Forceful kill of a single pid.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::models::KillResult;

/// Resolve `pid` against the live process table and send it an unconditional kill.
/// Does not wait for the process to exit.
pub(super) fn kill_process(pid: u32) -> KillResult {
    // pid 0 addresses the caller's process group in kill(2); it never names a single process.
    if pid == 0 {
        return KillResult::NotFound;
    }
    let sysinfo_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sysinfo_pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    if sys.process(sysinfo_pid).is_none() {
        return KillResult::NotFound;
    }
    send_kill(pid, &sys)
}

#[cfg(unix)]
fn send_kill(pid: u32, _sys: &System) -> KillResult {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        return KillResult::NotFound;
    };
    // SAFETY: kill(2) takes plain integers; raw_pid is positive so only that process is signalled.
    let rc = unsafe { libc::kill(raw_pid, libc::SIGKILL) };
    if rc == 0 {
        return KillResult::Terminated(pid);
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        // Exited between lookup and signal.
        Some(libc::ESRCH) => KillResult::NotFound,
        Some(libc::EPERM) => KillResult::Forbidden,
        _ => KillResult::Failed(err.to_string()),
    }
}

#[cfg(not(unix))]
fn send_kill(pid: u32, sys: &System) -> KillResult {
    let Some(process) = sys.process(Pid::from_u32(pid)) else {
        return KillResult::NotFound;
    };
    let sent = match process.kill_with(sysinfo::Signal::Kill) {
        Some(sent) => sent,
        // Signal not supported on this platform, fall back to kill()
        None => process.kill(),
    };
    if sent {
        KillResult::Terminated(pid)
    } else {
        KillResult::Failed(format!("kill request for PID {pid} was rejected by the OS"))
    }
}

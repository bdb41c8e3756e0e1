//! Child process discovery and termination escalation. Child enumeration is
//! Linux-specific (`/proc/<pid>/task/*/children`); on a non-Linux target
//! this would be swapped for tracking only the PIDs already registered in
//! `active_jobs`.

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub const SIGTERM_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Direct children of `pid`, discovered via procfs. Best-effort: an
/// unreadable or absent procfs entry yields an empty list rather than an
/// error, since child discovery is bookkeeping, not load-bearing.
pub fn child_pids(pid: Pid) -> Vec<Pid> {
    let task_dir = format!("/proc/{}/task", pid.as_raw());
    let Ok(entries) = fs::read_dir(&task_dir) else {
        return Vec::new();
    };

    let mut children = Vec::new();
    for entry in entries.flatten() {
        let children_file = entry.path().join("children");
        if let Ok(contents) = fs::read_to_string(&children_file) {
            for token in contents.split_whitespace() {
                if let Ok(child_pid) = token.parse::<i32>() {
                    children.push(Pid::from_raw(child_pid));
                }
            }
        }
    }
    children
}

/// SIGKILL + blocking wait.
pub fn kill_job(pid: Pid) {
    match kill(pid, Signal::SIGKILL) {
        Ok(()) => info!("sent SIGKILL to pid {pid}"),
        Err(e) => {
            error!("failed to send SIGKILL to pid {pid}: {e}");
            return;
        }
    }

    match waitpid(pid, None) {
        Ok(_) => info!("pid {pid} reaped after SIGKILL"),
        Err(e) => error!("failed to reap pid {pid} after SIGKILL: {e}"),
    }
}

/// SIGTERM -> poll -> SIGKILL escalation with descendants interrupted first
/// (post-order).
pub fn interrupt_job_with_timeout(pid: Pid, sigterm_timeout: Duration) {
    for child in child_pids(pid) {
        interrupt_job_with_timeout(child, sigterm_timeout);
    }

    if let Err(e) = kill(pid, Signal::SIGTERM) {
        warn!("failed to send SIGTERM to pid {pid}: {e}");
        return;
    }
    info!("sent SIGTERM to pid {pid}");

    let deadline = Instant::now() + sigterm_timeout;
    loop {
        // waitpid only succeeds for direct children of this process; for
        // deeper descendants this logs and returns once the signal lands.
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                if Instant::now() >= deadline {
                    warn!(
                        "pid {pid} ignored SIGTERM for {sigterm_timeout:?}, escalating to SIGKILL"
                    );
                    kill_job(pid);
                    return;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Ok(_) => {
                info!("pid {pid} exited after SIGTERM");
                return;
            }
            Err(e) => {
                warn!("waitpid({pid}) failed while polling for SIGTERM exit: {e}");
                return;
            }
        }
    }
}

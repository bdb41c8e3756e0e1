//! [`JobManager`]: the process supervisor.

use super::process_tree::{child_pids, interrupt_job_with_timeout, kill_job, SIGTERM_TIMEOUT as DEFAULT_SIGTERM_TIMEOUT};
use super::sync_job::SyncJob;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Hang-detection window: a tracked job still running past this long is
/// presumed stuck and interrupted.
pub const JOB_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);
const REAPER_POLL_INTERVAL: Duration = Duration::from_secs(60);

struct ReaperControl {
    stop: Mutex<bool>,
    wakeup: Condvar,
}

/// Spawns, tracks, reaps, and terminates supervised child processes.
/// `active_jobs` is the only mutable state shared across the main tick
/// worker, the reaper thread, and the manual-sync worker; every access
/// takes `job_mutex`.
pub struct JobManager {
    active_jobs: Mutex<HashMap<i32, SyncJob>>,
    reaper_control: Arc<ReaperControl>,
    reaper_handle: Mutex<Option<JoinHandle<()>>>,
    job_timeout: Duration,
    sigterm_timeout: Duration,
}

impl JobManager {
    pub fn new() -> Arc<Self> {
        Self::with_timeouts(JOB_TIMEOUT, DEFAULT_SIGTERM_TIMEOUT)
    }

    /// Test-only hook: a shorter hang-detection window so escalation tests
    /// don't wait six hours for a timeout to trip.
    pub fn with_job_timeout(job_timeout: Duration) -> Arc<Self> {
        Self::with_timeouts(job_timeout, DEFAULT_SIGTERM_TIMEOUT)
    }

    /// Test-only hook: both the hang-detection window and the SIGTERM grace
    /// period are configurable so escalation tests finish in milliseconds.
    pub fn with_timeouts(job_timeout: Duration, sigterm_timeout: Duration) -> Arc<Self> {
        let manager = Arc::new(JobManager {
            active_jobs: Mutex::new(HashMap::new()),
            reaper_control: Arc::new(ReaperControl {
                stop: Mutex::new(false),
                wakeup: Condvar::new(),
            }),
            reaper_handle: Mutex::new(None),
            job_timeout,
            sigterm_timeout,
        });

        let reaper_manager = Arc::clone(&manager);
        let handle = thread::spawn(move || reaper_manager.reaper_loop());
        *manager.reaper_handle.lock().unwrap() = Some(handle);

        manager
    }

    fn reaper_loop(self: Arc<Self>) {
        loop {
            trace!("process reaper thread going to sleep");
            let guard = self.reaper_control.stop.lock().unwrap();
            let (guard, _) = self
                .reaper_control
                .wakeup
                .wait_timeout(guard, REAPER_POLL_INTERVAL)
                .unwrap();
            trace!("process reaper thread woke up");

            let stop_requested = *guard;
            drop(guard);

            if stop_requested {
                info!("process reaper thread stop requested");
                self.kill_all_jobs();
                return;
            }

            self.reap_once();
        }
    }

    /// One reap pass over this process's children. Public so tests can
    /// trigger a reap without waiting out the full 1-minute poll interval
    /// the background reaper thread uses.
    pub fn reap_once(&self) {
        let own_pid = Pid::from_raw(std::process::id() as i32);
        let children = child_pids(own_pid);
        if children.is_empty() {
            trace!("no active jobs to reap");
            return;
        }

        let mut completed = Vec::new();

        for pid in children {
            let tracked = {
                let jobs = self.active_jobs.lock().unwrap();
                jobs.get(&pid.as_raw())
                    .map(|j| (j.job_name.clone(), j.start_time))
            };

            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {
                    if let Some((name, started)) = &tracked {
                        if started.elapsed() > self.job_timeout {
                            warn!(
                                "JOB_TIMEOUT: project {name} (pid {pid}) exceeded the hang \
                                 timeout, interrupting"
                            );
                            interrupt_job_with_timeout(pid, self.sigterm_timeout);
                            completed.push(pid.as_raw());
                        }
                    }
                }
                Ok(WaitStatus::Exited(_, code)) => {
                    match &tracked {
                        Some((name, _)) if code == 0 => {
                            info!("project {name} (pid {pid}) synced successfully")
                        }
                        Some((name, _)) => {
                            warn!("project {name} (pid {pid}) failed to sync, exit code {code}")
                        }
                        None => debug!("reaped untracked child pid {pid} (exit code {code})"),
                    }
                    completed.push(pid.as_raw());
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    if let Some((name, _)) = &tracked {
                        warn!("project {name} (pid {pid}) was killed by signal {signal:?}");
                    }
                    completed.push(pid.as_raw());
                }
                Ok(_) => {}
                Err(e) => {
                    if let Some((name, _)) = &tracked {
                        error!("WAIT_FAIL: waitpid({pid}) for project {name} failed: {e}");
                    }
                    completed.push(pid.as_raw());
                }
            }
        }

        self.deregister(&completed);
    }

    fn deregister(&self, pids: &[i32]) {
        if pids.is_empty() {
            return;
        }
        trace!("deregistering {} jobs", pids.len());
        let mut jobs = self.active_jobs.lock().unwrap();
        for pid in pids {
            jobs.remove(pid);
        }
    }

    fn kill_all_jobs(&self) {
        info!("killing all active sync jobs");
        let pids: Vec<i32> = {
            let jobs = self.active_jobs.lock().unwrap();
            jobs.keys().copied().collect()
        };
        for pid in pids {
            kill_job(Pid::from_raw(pid));
        }
        self.active_jobs.lock().unwrap().clear();
    }

    /// Spawns the given argv as a tracked job. Returns `false` (without
    /// starting anything) on duplicate suppression, empty argv, or a spawn
    /// failure.
    pub fn start_job(&self, job_name: &str, argv: &[String], password_file: Option<&Path>) -> bool {
        {
            let jobs = self.active_jobs.lock().unwrap();
            if jobs.values().any(|j| j.job_name == job_name) {
                warn!("DUPLICATE_JOB: a job named '{job_name}' is already running");
                return false;
            }
        }

        let Some((program, args)) = argv.split_first() else {
            error!("cannot start job '{job_name}': empty argv");
            return false;
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        if let Some(password_file) = password_file {
            if password_file.is_file() {
                match std::fs::read_to_string(password_file) {
                    Ok(contents) => {
                        if let Some(token) = contents.split_whitespace().next() {
                            command.env("RSYNC_PASSWORD", token);
                        }
                    }
                    Err(e) => error!("failed to read password file for '{job_name}': {e}"),
                }
            }
        }

        // Own process group so a signal delivered to the scheduler's
        // process group doesn't also reach the child.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(std::io::Error::from)?;
                Ok(())
            });
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("failed to start job '{job_name}': {e}");
                return false;
            }
        };

        let pid = child.id() as i32;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        debug!("registering job '{job_name}' (pid {pid})");
        self.active_jobs.lock().unwrap().insert(
            pid,
            SyncJob {
                job_name: job_name.to_string(),
                stdout,
                stderr,
                start_time: Instant::now(),
            },
        );
        true
    }

    pub fn active_job_count(&self) -> usize {
        self.active_jobs.lock().unwrap().len()
    }

    pub fn is_job_active(&self, job_name: &str) -> bool {
        self.active_jobs
            .lock()
            .unwrap()
            .values()
            .any(|j| j.job_name == job_name)
    }

    /// Stop flag -> notify -> join, then `kill_all_jobs` as the reaper's
    /// last act.
    pub fn shutdown(&self) {
        {
            let mut stop = self.reaper_control.stop.lock().unwrap();
            *stop = true;
        }
        self.reaper_control.wakeup.notify_all();

        if let Some(handle) = self.reaper_handle.lock().unwrap().take() {
            info!("joining process reaper thread");
            let _ = handle.join();
            info!("process reaper thread joined");
        }
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

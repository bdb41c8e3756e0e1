//! [`SyncScheduler`]: the orchestrator tying the catalogue, schedule, and
//! job manager together.

pub mod manual_sync;

pub use manual_sync::serve as serve_manual_sync;

use crate::catalogue::ProjectCatalogue;
use crate::jobs::JobManager;
use crate::schedule::Schedule;
use std::sync::Arc;
use tokio::time::Instant as TokioInstant;
use tracing::{debug, info};

/// Orchestrator: owns the catalogue, the built [`Schedule`], and the
/// [`JobManager`]; drives the tick loop and (via [`manual_sync`]) the
/// manual-sync side channel. Constructed once per process via dependency
/// injection rather than a process-wide singleton.
pub struct SyncScheduler {
    catalogue: ProjectCatalogue,
    schedule: Schedule,
    job_manager: Arc<JobManager>,
    dry_run: bool,
    manual_sync_port: u16,
}

impl SyncScheduler {
    pub fn new(
        catalogue: ProjectCatalogue,
        job_manager: Arc<JobManager>,
        dry_run: bool,
        manual_sync_port: u16,
    ) -> Arc<Self> {
        let schedule = Schedule::build(&catalogue);
        Arc::new(SyncScheduler {
            catalogue,
            schedule,
            job_manager,
            dry_run,
            manual_sync_port,
        })
    }

    pub fn catalogue(&self) -> &ProjectCatalogue {
        &self.catalogue
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn manual_sync_port(&self) -> u16 {
        self.manual_sync_port
    }

    /// Fires every command for `project_name`, using the base name for the
    /// first command and `"<name>_part_<i>"` (1-indexed) for the rest so
    /// duplicate suppression stays per-sub-command. Returns `true` only if
    /// every `start_job` call succeeded (or dry-run).
    pub fn start_sync(&self, project_name: &str) -> bool {
        let Some(project) = self.catalogue.get(project_name) else {
            return false;
        };

        if self.dry_run {
            info!("DRY_RUN: would start sync for project '{project_name}'");
            return true;
        }

        let mut all_started = true;
        for (i, argv) in project.commands.iter().enumerate() {
            let job_name = if i == 0 {
                project_name.to_string()
            } else {
                format!("{project_name}_part_{i}")
            };
            let started =
                self.job_manager
                    .start_job(&job_name, argv, project.password_file.as_deref());
            all_started &= started;
        }
        all_started
    }

    /// The `"all_projects"` sentinel: start every project in deterministic
    /// name order; success only if all started.
    pub fn start_all(&self) -> bool {
        let mut all_started = true;
        for name in self.catalogue.keys() {
            all_started &= self.start_sync(name);
        }
        all_started
    }

    /// The main tick loop: never returns under normal operation. The
    /// caller races this future against a shutdown signal.
    pub async fn run(self: Arc<Self>) {
        loop {
            let (fire_time, batch) = self.schedule.get_next_sync_batch(chrono::Utc::now());

            let now = chrono::Utc::now();
            let delay = (fire_time - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            debug!("next sync batch fires at {fire_time} ({} project(s))", batch.len());
            tokio::time::sleep_until(TokioInstant::now() + delay).await;

            for name in &batch {
                info!("firing scheduled sync for project '{name}'");
                self.start_sync(name);
            }
        }
    }
}

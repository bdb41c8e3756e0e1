//! Black-box `SyncScheduler::start_sync` over a multi-command project,
//! exercising the `"<name>_part_<i>"` duplicate-suppression naming scheme
//! through the public API rather than `JobManager` alone.

use mirror_sync_scheduler::catalogue::sync_details::{SyncDetails, SyncMethod};
use mirror_sync_scheduler::jobs::JobManager;
use mirror_sync_scheduler::scheduler::SyncScheduler;
use std::collections::BTreeMap;
use std::thread::sleep;
use std::time::Duration;

fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".into(), "-c".into(), script.into()]
}

#[test]
fn multi_command_project_registers_one_job_per_command() {
    let mut catalogue = BTreeMap::new();
    catalogue.insert(
        "multi".to_string(),
        SyncDetails {
            name: "multi".to_string(),
            syncs_per_day: 1,
            sync_method: SyncMethod::Rsync,
            commands: vec![sh("sleep 0.2"), sh("sleep 0.2")],
            password_file: None,
        },
    );

    let job_manager = JobManager::with_job_timeout(Duration::from_secs(3600));
    let scheduler = SyncScheduler::new(catalogue, job_manager.clone(), false, 0);

    assert!(scheduler.start_sync("multi"));
    assert_eq!(job_manager.active_job_count(), 2);
    assert!(job_manager.is_job_active("multi"));
    assert!(job_manager.is_job_active("multi_part_1"));

    // A second start_sync while the first pair is still running should hit
    // duplicate suppression and report failure on at least one sub-command.
    assert!(!scheduler.start_sync("multi"));

    sleep(Duration::from_millis(400));
    job_manager.reap_once();
    assert_eq!(job_manager.active_job_count(), 0);

    job_manager.shutdown();
}

#[test]
fn dry_run_reports_success_without_spawning() {
    let mut catalogue = BTreeMap::new();
    catalogue.insert(
        "quiet".to_string(),
        SyncDetails {
            name: "quiet".to_string(),
            syncs_per_day: 1,
            sync_method: SyncMethod::Script,
            commands: vec![sh("sleep 60")],
            password_file: None,
        },
    );

    let job_manager = JobManager::with_job_timeout(Duration::from_secs(3600));
    let scheduler = SyncScheduler::new(catalogue, job_manager.clone(), true, 0);

    assert!(scheduler.start_sync("quiet"));
    assert_eq!(job_manager.active_job_count(), 0);

    job_manager.shutdown();
}

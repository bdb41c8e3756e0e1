//! Black-box manual-sync round-trip for the `"all_projects"` sentinel,
//! complementing the per-project round-trip tests already covered inside
//! `scheduler::manual_sync`'s unit tests.

use mirror_sync_scheduler::catalogue::sync_details::{SyncDetails, SyncMethod};
use mirror_sync_scheduler::jobs::JobManager;
use mirror_sync_scheduler::scheduler::{serve_manual_sync, SyncScheduler};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn catalogue() -> BTreeMap<String, SyncDetails> {
    let mut catalogue = BTreeMap::new();
    for name in ["alpha", "beta"] {
        catalogue.insert(
            name.to_string(),
            SyncDetails {
                name: name.to_string(),
                syncs_per_day: 1,
                sync_method: SyncMethod::Script,
                commands: vec![vec!["/bin/sh".into(), "-c".into(), "true".into()]],
                password_file: None,
            },
        );
    }
    catalogue
}

#[tokio::test]
async fn all_projects_sentinel_starts_every_project() {
    let job_manager = JobManager::with_job_timeout(Duration::from_secs(3600));
    let scheduler = SyncScheduler::new(catalogue(), job_manager, true, 0);

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let handle = tokio::spawn(serve_manual_sync(scheduler, port));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    stream.write_all(b"all_projects").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();
    assert_eq!(reply, "SUCCESS: started sync for all_projects");

    handle.abort();
}

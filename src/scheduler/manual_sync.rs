//! Manual-sync side channel. One TCP connection, one request, one reply:
//! the client writes a UTF-8 project name (or the sentinel
//! `"all_projects"`) and shuts down its write half; the worker reads the
//! whole payload, dispatches to [`SyncScheduler`], writes back a
//! `"SUCCESS: "`/`"FAILURE: "` line, and closes the connection.

use super::SyncScheduler;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const ALL_PROJECTS_SENTINEL: &str = "all_projects";

/// Binds the reply socket and serves requests until the listener errors or
/// the task is cancelled by the caller. There is no in-band cancellation
/// path here; graceful shutdown relies on closing the bound socket from
/// the outside or process-level termination.
pub async fn serve(scheduler: Arc<SyncScheduler>, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("manual-sync worker listening on port {port}");

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let scheduler = Arc::clone(&scheduler);

        tokio::spawn(async move {
            let mut payload = String::new();
            if let Err(e) = socket.read_to_string(&mut payload).await {
                warn!("manual-sync: failed to read request from {peer}: {e}");
                return;
            }

            let name = payload.trim();
            let reply = handle_request(&scheduler, name);

            if let Err(e) = socket.write_all(reply.as_bytes()).await {
                error!("manual-sync: failed to write reply to {peer}: {e}");
            }
            let _ = socket.shutdown().await;
        });
    }
}

fn handle_request(scheduler: &SyncScheduler, name: &str) -> String {
    if name == ALL_PROJECTS_SENTINEL {
        return if scheduler.start_all() {
            "SUCCESS: started sync for all_projects".to_string()
        } else {
            "FAILURE: one or more projects failed to start".to_string()
        };
    }

    if !scheduler.catalogue().contains_key(name) {
        return format!("FAILURE: Project {name} not found!");
    }

    if scheduler.start_sync(name) {
        format!("SUCCESS: started sync for {name}")
    } else {
        format!("FAILURE: failed to start sync for {name}")
    }
}

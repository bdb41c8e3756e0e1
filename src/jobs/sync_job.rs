//! Runtime bookkeeping for one active job.

use std::process::{ChildStderr, ChildStdout};
use std::time::Instant;

/// Owns the captured pipe ends for a running child. Dropping a `SyncJob`
/// closes both exactly once via `ChildStdout`/`ChildStderr`'s `Drop` impl,
/// satisfying the "closed exactly once, on removal" invariant without any
/// manual fd bookkeeping.
pub struct SyncJob {
    pub job_name: String,
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
    pub start_time: Instant,
}

//! Process supervision: spawning, tracking, reaping, and terminating
//! supervised sync child processes.

pub mod job_manager;
mod process_tree;
mod sync_job;

pub use job_manager::{JobManager, JOB_TIMEOUT};
pub use process_tree::SIGTERM_TIMEOUT;
pub use sync_job::SyncJob;

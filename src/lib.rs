//! Mirror sync scheduler core: a long-running service that determines when
//! each configured project must sync and supervises the child processes
//! that perform each sync.

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod schedule;
pub mod scheduler;

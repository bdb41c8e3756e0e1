//! [`SyncDetails`] construction: turning a raw project record into an
//! immutable, ready-to-schedule project.

use super::record::ProjectRecord;
use std::path::PathBuf;

const RSYNC_BIN: &str = "/usr/bin/rsync";
const SH_BIN: &str = "/bin/sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMethod {
    Rsync,
    Script,
}

/// Immutable per-project record. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct SyncDetails {
    pub name: String,
    pub syncs_per_day: u32,
    pub sync_method: SyncMethod,
    /// Ordered, non-empty argv vectors. RSYNC projects may carry more than
    /// one; SCRIPT projects carry exactly one.
    pub commands: Vec<Vec<String>>,
    pub password_file: Option<PathBuf>,
}

/// Outcome of building a single project's [`SyncDetails`], modeled as a
/// three-way result rather than an exception: static projects are a benign
/// skip, malformed ones are a logged skip, and only genuine construction
/// succeeds.
#[derive(Debug)]
pub enum ProjectBuild {
    Built(SyncDetails),
    /// STATIC_PROJECT — logged at trace, not an error.
    Static,
    /// MALFORMED_PROJECT — logged at error, with a human-readable reason.
    Malformed(String),
}

impl SyncDetails {
    pub fn from_record(name: &str, record: &ProjectRecord) -> ProjectBuild {
        if record.is_static.is_some() {
            return ProjectBuild::Static;
        }

        match (&record.rsync, &record.script) {
            (None, None) => ProjectBuild::Malformed(format!(
                "project '{name}' has neither an `rsync` nor a `script` section"
            )),
            (Some(rsync), _) => {
                let syncs_per_day = rsync.syncs_per_day;
                if !(1..=24).contains(&syncs_per_day) {
                    return ProjectBuild::Malformed(format!(
                        "project '{name}' has out-of-range syncs_per_day: {syncs_per_day}"
                    ));
                }

                let Some(entries) = rsync.options.entries() else {
                    return ProjectBuild::Malformed(format!(
                        "project '{name}' has empty rsync options"
                    ));
                };

                let source = source_spec(rsync.user.as_deref(), &rsync.host, &rsync.src);
                let commands = entries
                    .into_iter()
                    .map(|tokens| {
                        let mut argv = Vec::with_capacity(tokens.len() + 3);
                        argv.push(RSYNC_BIN.to_string());
                        argv.extend(tokens);
                        argv.push(source.clone());
                        argv.push(rsync.dest.clone());
                        argv
                    })
                    .collect();

                ProjectBuild::Built(SyncDetails {
                    name: name.to_string(),
                    syncs_per_day,
                    sync_method: SyncMethod::Rsync,
                    commands,
                    password_file: record.password_file.clone(),
                })
            }
            (None, Some(script)) => {
                let syncs_per_day = script.syncs_per_day;
                if !(1..=24).contains(&syncs_per_day) {
                    return ProjectBuild::Malformed(format!(
                        "project '{name}' has out-of-range syncs_per_day: {syncs_per_day}"
                    ));
                }

                let mut parts = vec![script.command.clone()];
                if let Some(args) = &script.arguments {
                    parts.extend(args.iter().cloned());
                }
                let full_command = parts.join(" ");

                ProjectBuild::Built(SyncDetails {
                    name: name.to_string(),
                    syncs_per_day,
                    sync_method: SyncMethod::Script,
                    commands: vec![vec![
                        SH_BIN.to_string(),
                        "-c".to_string(),
                        full_command,
                    ]],
                    password_file: record.password_file.clone(),
                })
            }
        }
    }
}

fn source_spec(user: Option<&str>, host: &str, src: &str) -> String {
    match user {
        Some(u) if !u.is_empty() => format!("{u}@{host}::{src}"),
        _ => format!("{host}::{src}"),
    }
}

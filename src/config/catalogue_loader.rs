//! Catalogue file loading: JSON on disk -> [`ProjectCatalogue`]. This is a
//! thin pre-validation step; the actual construction rules live in
//! `crate::catalogue::sync_details`, with I/O kept separate from
//! deserialization.

use crate::catalogue::{build_catalogue, CatalogueLoadReport, ProjectCatalogue, ProjectRecord};
use crate::error::{SchedulerError, SchedulerResult};
use error_stack::{Report, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, trace};

/// Reads and parses the catalogue file at `path`, separates
/// STATIC_PROJECT/MALFORMED_PROJECT skips from usable projects, logs each
/// skip at the appropriate severity, and fails with `EmptyCatalogue` if
/// nothing usable remains.
pub fn load_catalogue(path: &Path) -> SchedulerResult<(ProjectCatalogue, CatalogueLoadReport)> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Report::new(SchedulerError::CatalogueIo(e.to_string())))
        .attach_printable_lazy(|| format!("catalogue path: {}", path.display()))?;

    let raw: BTreeMap<String, ProjectRecord> = serde_json::from_str(&contents)
        .map_err(|e| Report::new(SchedulerError::CatalogueParse(e.to_string())))
        .attach_printable_lazy(|| format!("catalogue path: {}", path.display()))?;

    let (catalogue, report) = build_catalogue(raw);

    for name in &report.skipped_static {
        trace!("STATIC_PROJECT: '{name}' is marked static, skipping");
    }
    for (name, reason) in &report.skipped_malformed {
        error!("MALFORMED_PROJECT: '{name}': {reason}");
    }

    if catalogue.is_empty() {
        return Err(Report::new(SchedulerError::EmptyCatalogue));
    }

    Ok((catalogue, report))
}

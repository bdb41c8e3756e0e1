//! Project catalogue: the mapping of project name to its sync details.

pub mod record;
pub mod sync_details;

pub use record::ProjectRecord;
pub use sync_details::{ProjectBuild, SyncDetails, SyncMethod};

use std::collections::BTreeMap;

/// Name -> [`SyncDetails`]. `BTreeMap` gives deterministic, name-sorted
/// iteration for free, which keeps logging output reproducible without a
/// separate sort step.
pub type ProjectCatalogue = BTreeMap<String, SyncDetails>;

/// Outcome of building a [`ProjectCatalogue`] from raw records: the
/// catalogue itself plus the STATIC_PROJECT/MALFORMED_PROJECT skips, so the
/// caller can log them at the right severity without re-deriving which
/// project fell into which bucket.
#[derive(Debug, Default)]
pub struct CatalogueLoadReport {
    pub skipped_static: Vec<String>,
    pub skipped_malformed: Vec<(String, String)>,
}

pub fn build_catalogue(
    raw: BTreeMap<String, ProjectRecord>,
) -> (ProjectCatalogue, CatalogueLoadReport) {
    let mut catalogue = ProjectCatalogue::new();
    let mut report = CatalogueLoadReport::default();

    for (name, record) in raw {
        match SyncDetails::from_record(&name, &record) {
            ProjectBuild::Built(details) => {
                catalogue.insert(name, details);
            }
            ProjectBuild::Static => {
                report.skipped_static.push(name);
            }
            ProjectBuild::Malformed(reason) => {
                report.skipped_malformed.push((name, reason));
            }
        }
    }

    (catalogue, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use record::{OptionsSpec, RsyncSection};

    #[test]
    fn mixed_catalogue_separates_outcomes() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "debian".to_string(),
            ProjectRecord {
                is_static: None,
                rsync: Some(RsyncSection {
                    syncs_per_day: 4,
                    options: OptionsSpec::Single("-az".into()),
                    user: None,
                    host: "h".into(),
                    src: "debian".into(),
                    dest: "/d".into(),
                }),
                script: None,
                password_file: None,
            },
        );
        raw.insert(
            "legacy-mirror".to_string(),
            ProjectRecord {
                is_static: Some(serde_json::Value::Bool(true)),
                rsync: None,
                script: None,
                password_file: None,
            },
        );
        raw.insert(
            "ghost".to_string(),
            ProjectRecord {
                is_static: None,
                rsync: None,
                script: None,
                password_file: None,
            },
        );

        let (catalogue, report) = build_catalogue(raw);
        assert_eq!(catalogue.len(), 1);
        assert!(catalogue.contains_key("debian"));
        assert_eq!(report.skipped_static, vec!["legacy-mirror".to_string()]);
        assert_eq!(report.skipped_malformed.len(), 1);
        assert_eq!(report.skipped_malformed[0].0, "ghost");
    }
}

//! Error types for the sync scheduler core.
//!
//! [`SchedulerError`] is the single canonical error context, following the
//! same `thiserror` + `error_stack` split the rest of the ambient stack
//! uses: call sites that need attached context build an
//! `error_stack::Report<SchedulerError>`, everything else just returns
//! [`SchedulerResult`].

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchedulerError {
    /// The catalogue file could not be read from disk.
    #[error("failed to read catalogue file: {0}")]
    CatalogueIo(String),

    /// The catalogue file did not parse as the expected JSON shape.
    #[error("failed to parse catalogue JSON: {0}")]
    CatalogueParse(String),

    /// The catalogue contained zero usable projects after STATIC_PROJECT
    /// and MALFORMED_PROJECT filtering. Fatal: the service does not start.
    #[error("catalogue is empty after filtering static/malformed projects")]
    EmptyCatalogue,

    /// A network bind for the manual-sync worker failed.
    #[error("failed to bind manual-sync listener on port {port}: {source}")]
    ManualSyncBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

pub type SchedulerResult<T> = error_stack::Result<T, SchedulerError>;

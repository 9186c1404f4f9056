use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a load cycle. Everything downstream of the loader is
/// infallible and degrades to empty results instead.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source is missing, unreadable, or not parseable as delimited data.
    #[error("failed to read data source {}", .path.display())]
    DataSource {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent after alternate-name tolerance.
    #[error("{} is missing required column `{column}`", .path.display())]
    Schema { path: PathBuf, column: String },
}

impl DashboardError {
    pub(crate) fn data_source(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::DataSource {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn schema(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            column: column.into(),
        }
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

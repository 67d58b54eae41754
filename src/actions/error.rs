use thiserror::Error;

/// Per-pacscript failure reasons. One pacscript failing never aborts the
/// batch; these are collected and reported individually.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Failed to parse pacscript: {0}")]
    ParseError(String),
    #[error("Invalid repology filter ({0})")]
    InvalidFilterSpec(String),
    #[error("Repology query failed: {0}")]
    QueryFailed(String),
    #[error("No equivalent package found on repology")]
    NoPackageFound,
    #[error("Failed to fetch the new artifact: {0}")]
    FetchFailed(String),
}

impl UpdateError {
    /// `NoPackageFound` is a legitimate "unknown to Repology" outcome and is
    /// reported as a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateError::NoPackageFound)
    }
}

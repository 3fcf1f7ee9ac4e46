use thiserror::Error;

use crate::models::ApplicationStatus;

/// Rejections raised before a search starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("please enter both city and state")]
    MissingLocation,

    #[error("search interval must be between 1 and 8760 hours")]
    InvalidInterval,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application not found: {0}")]
    UnknownApplication(String),

    #[error("application cannot move from {} to {}", from.as_str(), to.as_str())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error(transparent)]
    Search(#[from] SearchError),

    /// The write failed; in-memory state already holds the change
    #[error("failed to persist {key}: {source}")]
    Persist {
        key: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// An error that happens when fetching a record from the remote API.
///
/// These are produced by a [`DataSource`](crate::download::DataSource) and are passed through the
/// lazy collections unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The record does not exist at the remote.
    #[error("not found")]
    NotFound,
    /// The remote refused to serve the record.
    ///
    /// The attached string contains the remote's response.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The record could not be fetched due to another problem, like connection loss, DNS
    /// resolution, or a 5xx server response.
    #[error("download failed: {0}")]
    DownloadError(String),
    /// The record was fetched successfully, but does not have the expected shape.
    #[error("malformed: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Creates a [`DownloadError`](Self::DownloadError) from the innermost cause of `error`.
    pub(crate) fn download_error(mut error: &dyn StdError) -> Self {
        while let Some(src) = error.source() {
            error = src;
        }
        Self::DownloadError(error.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Errors surfaced by fetching an [`Element`](crate::lazy::Element) or a
/// [`List`](crate::lazy::List).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller passed an invalid page, page size or concurrency.
    ///
    /// This is raised before any request is made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// There is no element at the requested position.
    #[error("index {0} is out of range")]
    OutOfRange(usize),
    /// The fetched value did not match the predicate of
    /// [`Element::ensure`](crate::lazy::Element::ensure).
    #[error("the element did not match the predicate")]
    Mismatch,
    /// The fetched value was rejected with a caller supplied message.
    #[error("{0}")]
    Rejected(String),
    /// Fetching from the remote failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl Error {
    pub(crate) fn invalid_argument(name: &str, value: usize) -> Self {
        Self::InvalidArgument(format!("`{name}` must be larger than 0, got {value}"))
    }
}

use async_trait::async_trait;
use http::StatusCode;

use crate::client::DavClient;
use crate::error::OperationError;
use crate::file::RemoteFile;

/// Outcome of one remote operation.
///
/// `status` is the raw status the server answered with, even when the
/// operation failed; it is `None` only if no response was received.
#[derive(Debug)]
pub struct OperationResult<T> {
    pub status: Option<StatusCode>,
    pub outcome: Result<T, OperationError>,
}
impl<T> OperationResult<T> {
    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            status: Some(status),
            outcome: Ok(data),
        }
    }

    pub fn failure(status: Option<StatusCode>, err: impl Into<OperationError>) -> Self {
        Self {
            status,
            outcome: Err(err.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            status: self.status,
            outcome: self.outcome.map(f),
        }
    }

    pub fn into_result(self) -> Result<T, OperationError> {
        self.outcome
    }
}

/// A folder listing, or a single resource when `members` is empty
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Listing {
    pub root: Option<RemoteFile>,
    pub members: Vec<RemoteFile>,
}

/// Something that can be run against a server.
///
/// Operations never retry: a failure is reported and the caller decides.
#[async_trait]
pub trait RemoteOperation: Send + Sync {
    type Output: Send;

    async fn run(&self, client: &DavClient) -> OperationResult<Self::Output>;
}

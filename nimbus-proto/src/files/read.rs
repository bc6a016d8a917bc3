use async_trait::async_trait;

use nimbus_dav::catalog::{ALL_PROPERTIES, CHILDREN_COUNT, FILE_PROPERTIES};

use crate::client::DavClient;
use crate::error::OperationError;
use crate::file::RemoteFile;
use crate::operation::{Listing, OperationResult, RemoteOperation};
use crate::propfind::{Depth, PropFind};

/// List a folder and its direct children
#[derive(Debug, Clone)]
pub struct ReadFolder {
    pub remote_path: String,
}
impl ReadFolder {
    pub fn new(remote_path: impl Into<String>) -> Self {
        Self {
            remote_path: remote_path.into(),
        }
    }
}

#[async_trait]
impl RemoteOperation for ReadFolder {
    type Output = Listing;

    async fn run(&self, client: &DavClient) -> OperationResult<Listing> {
        let res = PropFind::new(&self.remote_path, Depth::One, ALL_PROPERTIES)
            .execute(client)
            .await;
        match res.outcome {
            Ok(Listing { root: None, .. }) => {
                tracing::warn!(path=%self.remote_path, "folder missing from its own listing");
                OperationResult::failure(res.status, OperationError::MissingRoot)
            }
            outcome => OperationResult {
                status: res.status,
                outcome,
            },
        }
    }
}

/// Fetch the properties of a single file or folder
#[derive(Debug, Clone)]
pub struct ReadFile {
    pub remote_path: String,
}
impl ReadFile {
    pub fn new(remote_path: impl Into<String>) -> Self {
        Self {
            remote_path: remote_path.into(),
        }
    }
}

#[async_trait]
impl RemoteOperation for ReadFile {
    type Output = RemoteFile;

    async fn run(&self, client: &DavClient) -> OperationResult<RemoteFile> {
        let res = PropFind::new(&self.remote_path, Depth::Zero, FILE_PROPERTIES)
            .execute(client)
            .await;
        match res.outcome {
            Ok(Listing { root: Some(file), .. }) => OperationResult {
                status: res.status,
                outcome: Ok(file),
            },
            Ok(Listing { root: None, .. }) => {
                OperationResult::failure(res.status, OperationError::MissingRoot)
            }
            Err(e) => OperationResult::failure(res.status, e),
        }
    }
}

/// Count the direct children of a folder, asking for as little as possible
#[derive(Debug, Clone)]
pub struct CountChildren {
    pub remote_path: String,
}
impl CountChildren {
    pub fn new(remote_path: impl Into<String>) -> Self {
        Self {
            remote_path: remote_path.into(),
        }
    }
}

#[async_trait]
impl RemoteOperation for CountChildren {
    type Output = usize;

    async fn run(&self, client: &DavClient) -> OperationResult<usize> {
        let res = PropFind::new(&self.remote_path, Depth::One, CHILDREN_COUNT)
            .execute(client)
            .await;
        match res.outcome {
            Ok(Listing { root: None, .. }) => {
                OperationResult::failure(res.status, OperationError::MissingRoot)
            }
            Ok(listing) => OperationResult {
                status: res.status,
                outcome: Ok(listing.members.len()),
            },
            Err(e) => OperationResult::failure(res.status, e),
        }
    }
}

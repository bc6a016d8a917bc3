use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};

use nimbus_dav::catalog::PropertySet;
use nimbus_dav::encoder::{self, PropFind as PropFindBody};
use nimbus_dav::multistatus;

use crate::client::DavClient;
use crate::error::{OperationError, TransportError};
use crate::file::RemoteFile;
use crate::operation::{Listing, OperationResult, RemoteOperation};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Depth {
    Zero,
    One,
}
impl Depth {
    fn header(&self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

pub(crate) fn method(name: &'static str) -> Result<Method, TransportError> {
    Method::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

/// A PROPFIND on one path of the user's files
#[derive(Debug, Clone)]
pub struct PropFind {
    pub path: String,
    pub depth: Depth,
    pub properties: PropertySet,
}
impl PropFind {
    pub fn new(path: impl Into<String>, depth: Depth, properties: PropertySet) -> Self {
        Self {
            path: path.into(),
            depth,
            properties,
        }
    }

    pub async fn execute(&self, client: &DavClient) -> OperationResult<Listing> {
        if client.follows_redirects() {
            tracing::error!(path=%self.path, "refusing to send a PROPFIND through a redirect following transport");
            return OperationResult::failure(None, OperationError::RedirectsEnabled);
        }

        let body = match encoder::to_bytes(&PropFindBody::from(&self.properties)).await {
            Ok(b) => b,
            Err(e) => return OperationResult::failure(None, OperationError::Encode(e.to_string())),
        };
        let mut headers = HeaderMap::new();
        headers.insert("depth", HeaderValue::from_static(self.depth.header()));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );

        let uri = client.files_dav_uri(&self.path);
        let propfind = match method("PROPFIND") {
            Ok(m) => m,
            Err(e) => return OperationResult::failure(None, e),
        };
        let resp = match client.execute(propfind, &uri, headers, body).await {
            Ok(r) => r,
            Err(e) => return OperationResult::failure(None, e),
        };

        let status = resp.status();
        if status != StatusCode::MULTI_STATUS {
            tracing::info!(path=%self.path, status=%status, "PROPFIND failed");
            return OperationResult::failure(Some(status), OperationError::Status(status));
        }

        let dav_root = client.files_dav_path();
        let parsed = multistatus::parse(
            resp.body(),
            &uri,
            &self.properties,
            client.registry(),
            Some(&dav_root),
        )
        .await;
        let parsed = match parsed {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(path=%self.path, err=%e, "unable to parse multistatus");
                return OperationResult::failure(Some(status), e);
            }
        };

        let listing = Listing {
            root: parsed
                .root
                .as_ref()
                .map(|r| RemoteFile::from_resource(r, &dav_root)),
            members: parsed
                .members
                .iter()
                .map(|m| RemoteFile::from_resource(m, &dav_root))
                .collect(),
        };
        tracing::debug!(path=%self.path, members=listing.members.len(), "PROPFIND done");
        OperationResult::success(status, listing)
    }
}

#[async_trait]
impl RemoteOperation for PropFind {
    type Output = Listing;

    async fn run(&self, client: &DavClient) -> OperationResult<Listing> {
        self.execute(client).await
    }
}

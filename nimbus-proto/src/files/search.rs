use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::StatusCode;

use nimbus_dav::catalog::FILE_PROPERTIES;
use nimbus_dav::encoder::{self, SearchFilter, SearchRequest};
use nimbus_dav::multistatus;

use crate::client::DavClient;
use crate::error::OperationError;
use crate::file::RemoteFile;
use crate::operation::{OperationResult, RemoteOperation};
use crate::propfind::method;

/// Server side search in the user's files.
///
/// Results are flat: there is no requested resource, every match below the
/// user's files is returned in the order the server sent it.
#[derive(Debug, Clone)]
pub struct Search {
    pub filter: SearchFilter,
    /// Folder searched recursively
    pub remote_path: String,
    pub limit: Option<u32>,
}
impl Search {
    pub fn by_name(text: impl Into<String>) -> Self {
        Self::new(SearchFilter::NameContains(text.into()))
    }

    pub fn favorites() -> Self {
        Self::new(SearchFilter::Favorites)
    }

    fn new(filter: SearchFilter) -> Self {
        Self {
            filter,
            remote_path: "/".into(),
            limit: None,
        }
    }

    pub fn within(mut self, remote_path: impl Into<String>) -> Self {
        self.remote_path = remote_path.into();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn body(&self, user: &str) -> SearchRequest {
        let mut scope = format!("/files/{}", user);
        if !self.remote_path.starts_with('/') {
            scope.push('/');
        }
        scope.push_str(&self.remote_path);

        SearchRequest {
            properties: FILE_PROPERTIES.iter().copied().collect(),
            scope,
            filter: self.filter.clone(),
            limit: self.limit,
        }
    }
}

#[async_trait]
impl RemoteOperation for Search {
    type Output = Vec<RemoteFile>;

    async fn run(&self, client: &DavClient) -> OperationResult<Vec<RemoteFile>> {
        if client.follows_redirects() {
            tracing::error!(filter=?self.filter, "refusing to send a SEARCH through a redirect following transport");
            return OperationResult::failure(None, OperationError::RedirectsEnabled);
        }

        let body = match encoder::to_bytes(&self.body(client.user())).await {
            Ok(b) => b,
            Err(e) => return OperationResult::failure(None, OperationError::Encode(e.to_string())),
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=utf-8"),
        );

        let search = match method("SEARCH") {
            Ok(m) => m,
            Err(e) => return OperationResult::failure(None, e),
        };
        let resp = match client.execute(search, &client.dav_uri(), headers, body).await {
            Ok(r) => r,
            Err(e) => return OperationResult::failure(None, e),
        };

        let status = resp.status();
        if status != StatusCode::MULTI_STATUS {
            tracing::info!(filter=?self.filter, status=%status, "SEARCH failed");
            return OperationResult::failure(Some(status), OperationError::Status(status));
        }

        let dav_root = client.files_dav_path();
        let found = multistatus::parse_flat(
            resp.body(),
            &FILE_PROPERTIES,
            client.registry(),
            Some(&dav_root),
        )
        .await;
        match found {
            Ok(found) => {
                tracing::debug!(filter=?self.filter, results=found.len(), "SEARCH done");
                let files = found
                    .iter()
                    .map(|r| RemoteFile::from_resource(r, &dav_root))
                    .collect();
                OperationResult::success(status, files)
            }
            Err(e) => {
                tracing::error!(err=%e, "unable to parse search results");
                OperationResult::failure(Some(status), e)
            }
        }
    }
}

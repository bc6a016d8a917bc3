use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use http::header::{HeaderMap, HeaderValue};
use http::StatusCode;

use crate::client::DavClient;
use crate::error::OperationError;
use crate::operation::{OperationResult, RemoteOperation};
use crate::propfind::method;

/// Header carrying the end-to-end encryption lock token
pub const E2E_TOKEN: &str = "e2e-token";

/// Create a folder with MKCOL.
///
/// On success the result holds the `OC-FileId` the server gave the folder,
/// if any.
#[derive(Debug, Clone)]
pub struct CreateFolder {
    pub remote_path: String,
    /// Also create the missing ancestors
    pub create_full_path: bool,
    pub token: Option<String>,
}
impl CreateFolder {
    pub fn new(remote_path: impl Into<String>, create_full_path: bool) -> Self {
        Self {
            remote_path: remote_path.into(),
            create_full_path,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn create(&self, client: &DavClient) -> OperationResult<Option<String>> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(token) {
                Ok(v) => {
                    headers.insert(E2E_TOKEN, v);
                }
                Err(e) => tracing::warn!(err=%e, "ignoring invalid e2e token"),
            }
        }

        let mkcol = match method("MKCOL") {
            Ok(m) => m,
            Err(e) => return OperationResult::failure(None, e),
        };
        let uri = client.files_dav_uri(&self.remote_path);
        let resp = match client.execute(mkcol, &uri, headers, vec![]).await {
            Ok(r) => r,
            Err(e) => return OperationResult::failure(None, e),
        };

        let status = resp.status();
        tracing::debug!(path=%self.remote_path, status=%status, "create folder");
        match status {
            StatusCode::METHOD_NOT_ALLOWED => {
                OperationResult::failure(Some(status), OperationError::FolderAlreadyExists)
            }
            s if s.is_success() => {
                let file_id = resp
                    .headers()
                    .get("oc-fileid")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                OperationResult::success(status, file_id)
            }
            s => OperationResult::failure(Some(s), OperationError::Status(s)),
        }
    }

    fn run_boxed<'a>(&'a self, client: &'a DavClient) -> BoxFuture<'a, OperationResult<Option<String>>> {
        async move {
            let result = self.create(client).await;
            let conflict = result.status == Some(StatusCode::CONFLICT);
            if result.is_success() || !self.create_full_path || !conflict {
                return result;
            }

            let parent = match parent_path(&self.remote_path) {
                Some(p) => p,
                None => return result,
            };
            tracing::debug!(path=%self.remote_path, parent=%parent, "creating missing parent");
            let ancestor = CreateFolder {
                remote_path: parent,
                create_full_path: true,
                token: None,
            };
            let parent_result = ancestor.run_boxed(client).await;
            match parent_result.is_success() {
                // second and last try
                true => self.create(client).await,
                false => parent_result,
            }
        }
        .boxed()
    }
}

/// Parent of a remote path, `None` for the root
fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(idx) => Some(format!("{}/", &trimmed[..idx])),
        None => Some("/".into()),
    }
}

#[async_trait]
impl RemoteOperation for CreateFolder {
    type Output = Option<String>;

    async fn run(&self, client: &DavClient) -> OperationResult<Option<String>> {
        self.run_boxed(client).await
    }
}

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::StatusCode;

use nimbus_dav::encoder::{self, PropertyUpdate};
use nimbus_dav::names;

use crate::client::DavClient;
use crate::error::OperationError;
use crate::operation::{OperationResult, RemoteOperation};
use crate::propfind::method;

/// Mark or unmark a file as favorite with PROPPATCH
#[derive(Debug, Clone)]
pub struct ToggleFavorite {
    pub remote_path: String,
    pub favorite: bool,
}
impl ToggleFavorite {
    pub fn new(remote_path: impl Into<String>, favorite: bool) -> Self {
        Self {
            remote_path: remote_path.into(),
            favorite,
        }
    }

    fn body(&self) -> PropertyUpdate {
        match self.favorite {
            true => PropertyUpdate {
                set: vec![(names::FAVORITE, "1".into())],
                remove: vec![],
            },
            false => PropertyUpdate {
                set: vec![],
                remove: vec![names::FAVORITE],
            },
        }
    }
}

#[async_trait]
impl RemoteOperation for ToggleFavorite {
    type Output = ();

    async fn run(&self, client: &DavClient) -> OperationResult<()> {
        let body = match encoder::to_bytes(&self.body()).await {
            Ok(b) => b,
            Err(e) => return OperationResult::failure(None, OperationError::Encode(e.to_string())),
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );

        let proppatch = match method("PROPPATCH") {
            Ok(m) => m,
            Err(e) => return OperationResult::failure(None, e),
        };
        let uri = client.files_dav_uri(&self.remote_path);
        let resp = match client.execute(proppatch, &uri, headers, body).await {
            Ok(r) => r,
            Err(e) => return OperationResult::failure(None, e),
        };

        match resp.status() {
            s @ (StatusCode::MULTI_STATUS | StatusCode::OK) => OperationResult::success(s, ()),
            s => {
                tracing::info!(path=%self.remote_path, status=%s, "unable to toggle favorite");
                OperationResult::failure(Some(s), OperationError::Status(s))
            }
        }
    }
}

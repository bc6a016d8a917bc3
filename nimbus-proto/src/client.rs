use std::sync::Arc;

use http::header::HeaderMap;
use http::{Method, Request, Response};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use nimbus_dav::registry::Registry;

use crate::credentials::{Anonymous, Credentials};
use crate::error::TransportError;
use crate::transport::{HttpTransport, Transport};

/// Characters escaped in one segment of a remote path
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const DAV: &str = "/remote.php/dav";
const FILES_DAV: &str = "/remote.php/dav/files";

/// Percent-encode each segment of `path`, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| utf8_percent_encode(seg, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Everything needed to talk to one account on one server.
///
/// Cheap to clone, and safe to share between concurrent operations.
#[derive(Clone)]
pub struct DavClient {
    base_url: String,
    base_path: String,
    user: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn Credentials>,
    registry: Arc<Registry>,
}
impl DavClient {
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            user: String::new(),
            transport: None,
            credentials: None,
            registry: None,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn follows_redirects(&self) -> bool {
        self.transport.follows_redirects()
    }

    /// Root of the WebDAV endpoint, SEARCH requests are sent there
    pub fn dav_uri(&self) -> String {
        format!("{}{}/", self.base_url, DAV)
    }

    /// Path of the user's files collection, as the server writes it in hrefs
    pub fn files_dav_path(&self) -> String {
        format!(
            "{}{}/{}",
            self.base_path,
            FILES_DAV,
            utf8_percent_encode(&self.user, PATH_SEGMENT)
        )
    }

    /// Absolute URL of `remote_path` inside the user's files
    pub fn files_dav_uri(&self, remote_path: &str) -> String {
        let mut uri = format!(
            "{}{}/{}",
            self.base_url,
            FILES_DAV,
            utf8_percent_encode(&self.user, PATH_SEGMENT)
        );
        if !remote_path.is_empty() && !remote_path.starts_with('/') {
            uri.push('/');
        }
        uri.push_str(&encode_path(remote_path));
        uri
    }

    /// Send a request with the client credentials attached
    pub async fn execute(
        &self,
        method: Method,
        uri: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<Response<Vec<u8>>, TransportError> {
        let mut req = Request::builder().method(method).uri(uri).body(body)?;
        *req.headers_mut() = headers;
        self.credentials.attach(req.headers_mut());

        tracing::debug!(method=%req.method(), uri=%uri, "dav request");
        let resp = self.transport.send(req).await;
        match &resp {
            Ok(r) => tracing::debug!(uri=%uri, status=%r.status(), "dav response"),
            Err(e) => tracing::warn!(uri=%uri, err=%e, "dav request failed"),
        }
        resp
    }
}

pub struct ClientBuilder {
    base_url: String,
    user: String,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn Credentials>>,
    registry: Option<Arc<Registry>>,
}
impl ClientBuilder {
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn credentials(mut self, credentials: impl Credentials + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Defaults to [`Registry::shared`]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<DavClient, TransportError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let uri = base_url
            .parse::<http::Uri>()
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", base_url, e)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(TransportError::InvalidRequest(format!(
                "{} is not an absolute URL",
                base_url
            )));
        }
        if self.user.is_empty() {
            return Err(TransportError::InvalidRequest("missing user".into()));
        }
        let base_path = uri.path().trim_end_matches('/').to_string();

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(None)?),
        };

        Ok(DavClient {
            base_url,
            base_path,
            user: self.user,
            transport,
            credentials: self.credentials.unwrap_or_else(|| Arc::new(Anonymous)),
            registry: self.registry.unwrap_or_else(Registry::shared),
        })
    }
}

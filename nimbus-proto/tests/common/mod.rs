use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{Request, Response, StatusCode};

use nimbus_proto::client::DavClient;
use nimbus_proto::credentials::BasicAuth;
use nimbus_proto::error::TransportError;
use nimbus_proto::transport::Transport;

pub const SERVER: &str = "https://cloud.example.com";
pub const DAV_ROOT: &str = "/remote.php/dav/files/user";

#[derive(Default)]
struct Inner {
    requests: Mutex<Vec<Request<Vec<u8>>>>,
    responses: Mutex<VecDeque<Result<Response<Vec<u8>>, TransportError>>>,
    follows_redirects: bool,
}

/// In-memory transport: replays canned responses in order and keeps
/// every request it was given.
#[derive(Clone, Default)]
pub struct Replay(Arc<Inner>);
impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn following_redirects() -> Self {
        Self(Arc::new(Inner {
            follows_redirects: true,
            ..Default::default()
        }))
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let mut resp = Response::new(body.as_bytes().to_vec());
        *resp.status_mut() = StatusCode::from_u16(status).unwrap();
        self.push(Ok(resp))
    }

    pub fn respond_with_header(&self, status: u16, name: &'static str, value: &str) -> &Self {
        let mut resp = Response::new(vec![]);
        *resp.status_mut() = StatusCode::from_u16(status).unwrap();
        resp.headers_mut().insert(name, value.parse().unwrap());
        self.push(Ok(resp))
    }

    pub fn fail(&self, err: TransportError) -> &Self {
        self.push(Err(err))
    }

    fn push(&self, r: Result<Response<Vec<u8>>, TransportError>) -> &Self {
        self.0.responses.lock().unwrap().push_back(r);
        self
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.0
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                (
                    r.method().to_string(),
                    r.uri().to_string(),
                    String::from_utf8_lossy(r.body()).into_owned(),
                )
            })
            .collect()
    }

    pub fn header(&self, idx: usize, name: &str) -> Option<String> {
        self.0.requests.lock().unwrap()[idx]
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    }
}

#[async_trait]
impl Transport for Replay {
    async fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        self.0.requests.lock().unwrap().push(req);
        self.0
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no canned response left"))
    }

    fn follows_redirects(&self) -> bool {
        self.0.follows_redirects
    }
}

pub fn client(transport: &Replay) -> DavClient {
    DavClient::builder(SERVER)
        .user("user")
        .credentials(BasicAuth::new("user", "secret"))
        .transport(transport.clone())
        .build()
        .unwrap()
}

/// Wrap `<d:response>` elements into a multistatus document
pub fn multistatus(responses: &[(&str, &str)]) -> String {
    let mut doc = String::from(
        r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">"#,
    );
    for (href, props) in responses {
        doc.push_str(&format!(
            r#"
  <d:response>
    <d:href>{href}</d:href>
    <d:propstat>
      <d:prop>{props}</d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>"#
        ));
    }
    doc.push_str("\n</d:multistatus>");
    doc
}

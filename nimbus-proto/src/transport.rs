use std::time::Duration;

use async_trait::async_trait;
use http::{Request, Response};

use crate::error::TransportError;

/// Sends one fully buffered request and returns the fully buffered response.
///
/// Implementations must not follow redirects on their own: the hrefs of a
/// multistatus are matched against the URI that was requested.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError>;

    fn follows_redirects(&self) -> bool {
        false
    }
}

/// `reqwest` backed transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}
impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("nimbus/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let req = reqwest::Request::try_from(req)?;
        tracing::trace!(method=%req.method(), url=%req.url(), "sending request");

        let resp = self.client.execute(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();

        let mut out = Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer the first connection with `raw`, or keep it open without a word
    async fn serve_once(raw: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            match raw {
                Some(raw) => {
                    sock.write_all(raw.as_bytes()).await.unwrap();
                    let _ = sock.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(5)).await,
            }
        });
        format!("http://{}", addr)
    }

    fn propfind(uri: &str) -> Request<Vec<u8>> {
        Request::builder()
            .method("PROPFIND")
            .uri(uri)
            .header("depth", "1")
            .body(b"<d:propfind xmlns:d=\"DAV:\"/>".to_vec())
            .unwrap()
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let base = serve_once(Some(
            "HTTP/1.1 301 Moved Permanently\r\n\
             Location: http://127.0.0.1:1/elsewhere/\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        ))
        .await;

        let transport = HttpTransport::new(None).unwrap();
        assert!(!transport.follows_redirects());

        let resp = transport
            .send(propfind(&format!("{}/remote.php/dav/files/user/", base)))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "http://127.0.0.1:1/elsewhere/");
    }

    #[tokio::test]
    async fn multistatus_body_is_buffered() {
        let base = serve_once(Some(
            "HTTP/1.1 207 Multi-Status\r\n\
             Content-Type: application/xml; charset=utf-8\r\n\
             Content-Length: 27\r\n\
             Connection: close\r\n\r\n\
             <d:multistatus xmlns:d=\"\"/>",
        ))
        .await;

        let resp = HttpTransport::new(None)
            .unwrap()
            .send(propfind(&base))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::MULTI_STATUS);
        assert_eq!(resp.body().as_slice(), &b"<d:multistatus xmlns:d=\"\"/>"[..]);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let base = serve_once(None).await;
        let transport = HttpTransport::new(Some(Duration::from_millis(100))).unwrap();
        let got = transport.send(propfind(&base)).await;
        assert!(matches!(got, Err(TransportError::Timeout)), "{:?}", got);
    }
}

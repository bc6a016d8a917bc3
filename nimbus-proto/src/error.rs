use http::StatusCode;
use nimbus_dav::error::ParsingError;

/// The request did not produce a response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("request timed out")]
    Timeout,
    #[error("http client error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("unable to build request: {0}")]
    InvalidRequest(String),
}
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.is_timeout() {
            true => Self::Timeout,
            false => Self::Http(e),
        }
    }
}
impl From<http::Error> for TransportError {
    fn from(e: http::Error) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

/// Why a remote operation failed
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed multistatus: {0}")]
    Parse(#[from] ParsingError),
    #[error("unable to encode request body: {0}")]
    Encode(String),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("transport follows redirects, hrefs could not be matched to the request")]
    RedirectsEnabled,
    #[error("the requested resource is missing from the multistatus")]
    MissingRoot,
    #[error("folder already exists")]
    FolderAlreadyExists,
}

use base64::Engine;
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Adds authentication to every outgoing request
pub trait Credentials: Send + Sync {
    fn attach(&self, headers: &mut HeaderMap);
}

#[derive(Clone)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}
impl BasicAuth {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}
impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .finish()
    }
}
impl Credentials for BasicAuth {
    fn attach(&self, headers: &mut HeaderMap) {
        let creds = format!("{}:{}", self.user, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds.as_bytes());
        insert_authorization(headers, format!("Basic {}", encoded));
    }
}

#[derive(Clone)]
pub struct BearerToken(pub String);
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([redacted])")
    }
}
impl Credentials for BearerToken {
    fn attach(&self, headers: &mut HeaderMap) {
        insert_authorization(headers, format!("Bearer {}", self.0));
    }
}

/// Public shares and tests
#[derive(Clone, Debug, Default)]
pub struct Anonymous;
impl Credentials for Anonymous {
    fn attach(&self, _headers: &mut HeaderMap) {}
}

fn insert_authorization(headers: &mut HeaderMap, value: String) {
    match HeaderValue::from_str(&value) {
        Ok(mut v) => {
            v.set_sensitive(true);
            headers.insert(AUTHORIZATION, v);
        }
        Err(e) => tracing::warn!(err=%e, "credentials can not be sent as a header"),
    }
}

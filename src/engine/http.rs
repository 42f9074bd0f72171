use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use tracing::warn;
use url::Url;

use crate::error::LookupError;
use crate::lookup;

// ─── Outbound ─────────────────────────────────────────────────────────────────

/// Outbound request under construction.
///
/// Seeded from the runner's base URL and shared client, then handed to each
/// case's setup in declaration order. Later cases see and may overwrite what
/// earlier cases set.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Sent as-is whenever set, regardless of method.
    pub body: Option<String>,
    pub(crate) client: Client,
}

impl Outbound {
    pub(crate) fn new(base: Url, client: Client) -> Self {
        Self {
            method: Method::GET,
            url: base,
            headers: HeaderMap::new(),
            body: None,
            client,
        }
    }

    /// Insert a header, replacing any previous value under that name.
    ///
    /// An invalid name or value is dropped with a warning instead of
    /// interrupting the setup chain.
    pub fn header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!("ignoring invalid header `{name}: {value}`"),
        }
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// Replace the path component of the target URL.
    pub fn set_path(&mut self, path: &str) {
        self.url.set_path(path);
    }

    /// Append one query pair to the target URL.
    pub fn append_query(&mut self, key: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(key, value);
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }
}

// ─── Inbound ──────────────────────────────────────────────────────────────────

/// Immutable response snapshot handed to validators.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Time to response headers; the body read is excluded.
    pub duration: Duration,
    /// The user agent that actually went out with the request.
    pub user_agent: String,
    /// Final URL after redirects.
    pub url: Url,
}

impl Inbound {
    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Look up a response header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Parse the body as JSON and resolve `path` against it.
    ///
    /// Paths use a small JSONPath subset: `$`, `$.field.nested`,
    /// `$.items[2].id`.
    pub fn json_path(&self, path: &str) -> Result<serde_json::Value, LookupError> {
        let data: serde_json::Value = serde_json::from_slice(&self.body)?;
        lookup::resolve(&data, path)
    }

    /// Like [`Inbound::json_path`], but the value must be a string.
    pub fn json_path_str(&self, path: &str) -> Result<String, LookupError> {
        match self.json_path(path)? {
            serde_json::Value::String(value) => Ok(value),
            _ => Err(LookupError::NotAString {
                path: path.to_string(),
            }),
        }
    }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Issue the request described by `outbound` and snapshot the response.
pub(crate) async fn dispatch(outbound: Outbound) -> Result<Inbound, String> {
    let user_agent = outbound
        .headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut request = outbound
        .client
        .request(outbound.method, outbound.url)
        .headers(outbound.headers);
    if let Some(body) = outbound.body {
        request = request.body(body);
    }

    let start = Instant::now();
    let response = request
        .send()
        .await
        .map_err(|err| format!("Request failed: {err}"))?;
    let duration = start.elapsed();

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let url = response.url().clone();
    let body = response
        .bytes()
        .await
        .map_err(|err| format!("Failed to read response: {err}"))?;

    Ok(Inbound {
        status,
        headers,
        body,
        duration,
        user_agent,
        url,
    })
}

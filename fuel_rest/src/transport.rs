//! Low-level HTTP transport.
//!
//! Everything above this layer speaks in terms of `(method, path, params)`
//! and parsed JSON. The [`Transport`] trait is the seam where tests plug in a
//! scripted server, and [`HttpTransport`] is the real thing.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::errors::*;

/// The HTTP methods which the Fuel API uses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
}

impl Method {
    /// The upper-case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// Something which can perform a single HTTP request against the Fuel API.
///
/// Implementations must return `Ok(None)` for an empty response body, and
/// `Error::UnexpectedHttpStatus` for any status outside of 200-209. They must
/// not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `method` on `path` (relative to the API root), sending
    /// `params` as a JSON body if present.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
    ) -> Result<Option<Value>>;
}

/// A `Transport` which talks HTTP using `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    root_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport from `config`.
    pub fn new(config: &ClientConfig) -> Result<HttpTransport> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.auth_token_value() {
            let value = HeaderValue::from_str(token).map_err(|e| Error::Other {
                source: e.into(),
            })?;
            headers.insert(HeaderName::from_static("x-auth-token"), value);
        }
        for (name, value) in config.extra_headers() {
            let name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::Other {
                    source: e.into(),
                })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::Other {
                source: e.into(),
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout_value() {
            builder = builder.timeout(timeout);
        }
        Ok(HttpTransport {
            root_url: config.url().as_str().to_owned(),
            client: builder.build()?,
        })
    }

    /// Build the full URL for `path`.
    fn url(&self, path: &str) -> Result<Url> {
        let url = join_url(&self.root_url, path);
        Url::parse(&url).map_err(|e| Error::could_not_parse_url(url, e))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = self.url(path)?;
        debug!("HTTP: {} {}", method, url);

        let mut req = self.client.request(method.into(), url.clone());
        if method != Method::Get {
            if let Some(params) = params {
                req = req.json(params);
            }
        }
        let res = req
            .send()
            .await
            .map_err(|e| Error::could_not_access_url(&url, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::could_not_access_url(&url, e))?;
        if !is_success(status.as_u16()) {
            debug!("Error status: {} body: {}", status, body);
            return Err(Error::unexpected_http_status(url, status, body));
        }
        debug!("Success body: {}", &body);
        parse_body(&body).map_err(|e| Error::could_not_access_url(&url, e))
    }
}

/// Fuel answers with a handful of 2xx codes; anything past 209 is not one of
/// them.
fn is_success(status: u16) -> bool {
    (200..=209).contains(&status)
}

/// Parse a response body, treating an empty body as "no value".
fn parse_body(body: &str) -> Result<Option<Value>> {
    if body.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_str(body)?))
    }
}

/// Join the API root and a request path with exactly one `/` between them.
fn join_url(root_url: &str, path: &str) -> String {
    let root = root_url.strip_suffix('/').unwrap_or(root_url);
    if path.starts_with('/') {
        format!("{}{}", root, path)
    } else {
        format!("{}/{}", root, path)
    }
}

#[test]
fn join_url_adds_exactly_one_slash() {
    assert_eq!(
        join_url("http://10.20.0.2:8000/", "api/nodes"),
        "http://10.20.0.2:8000/api/nodes"
    );
    assert_eq!(
        join_url("http://10.20.0.2:8000", "/api/clusters/1/attributes/"),
        "http://10.20.0.2:8000/api/clusters/1/attributes/"
    );
    assert_eq!(
        join_url("http://10.20.0.2:8000", "api/tasks?tasks=3"),
        "http://10.20.0.2:8000/api/tasks?tasks=3"
    );
}

#[test]
fn only_200_through_209_count_as_success() {
    assert!(is_success(200));
    assert!(is_success(202));
    assert!(is_success(209));
    assert!(!is_success(210));
    assert!(!is_success(304));
    assert!(!is_success(404));
}

#[test]
fn empty_body_is_no_value() {
    assert_eq!(parse_body("").unwrap(), None);
    assert_eq!(
        parse_body(r#"{"status": "ready"}"#).unwrap(),
        Some(serde_json::json!({ "status": "ready" }))
    );
    assert!(parse_body("<html>").is_err());
}

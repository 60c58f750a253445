//! Connection settings.

use std::env;
use std::time::Duration;
use url::Url;

use crate::errors::*;

/// The environment variable holding the root URL of the Fuel API.
pub const URL_VAR: &str = "FUEL_URL";

/// The environment variable holding an optional Keystone token.
pub const AUTH_TOKEN_VAR: &str = "FUEL_AUTH_TOKEN";

/// The environment variable holding an optional per-request timeout, in
/// seconds.
pub const HTTP_TIMEOUT_VAR: &str = "FUEL_HTTP_TIMEOUT_SECS";

/// Settings used to connect to the Fuel API. This uses a "builder" pattern,
/// so you can write:
///
/// ```
/// use std::time::Duration;
/// use fuel_rest::ClientConfig;
///
/// let config = ClientConfig::new("http://10.20.0.2:8000")?
///     .auth_token("secret".to_owned())
///     .request_timeout(Duration::from_secs(30));
/// # Ok::<(), fuel_rest::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The root URL of the API.
    url: Url,

    /// Sent as `X-Auth-Token` when present.
    auth_token: Option<String>,

    /// How long a single request may take.
    request_timeout: Option<Duration>,

    /// Any other headers to send with every request.
    headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Create a configuration pointing at `url`.
    pub fn new(url: &str) -> Result<ClientConfig> {
        let parsed = Url::parse(url).map_err(|e| Error::could_not_parse_url(url, e))?;
        Ok(ClientConfig {
            url: parsed,
            auth_token: None,
            request_timeout: None,
            headers: vec![],
        })
    }

    /// Build a configuration from `FUEL_URL`, `FUEL_AUTH_TOKEN` and
    /// `FUEL_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<ClientConfig> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build a configuration by looking up variables with `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).ok_or_else(|| Error::missing_env_var(URL_VAR))?;
        let mut config = ClientConfig::new(&url)?;
        config.auth_token = lookup(AUTH_TOKEN_VAR).filter(|t| !t.is_empty());
        if let Some(secs) = lookup(HTTP_TIMEOUT_VAR) {
            let secs = secs.trim().parse::<u64>().map_err(|e| Error::Other {
                source: format!("invalid {}: {}", HTTP_TIMEOUT_VAR, e).into(),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Authenticate using `token`.
    pub fn auth_token<S: Into<Option<String>>>(mut self, token: S) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Give up on any single request after `timeout`. Note that this is
    /// unrelated to how long we wait for deployments.
    pub fn request_timeout<D: Into<Option<Duration>>>(mut self, timeout: D) -> Self {
        self.request_timeout = timeout.into();
        self
    }

    /// Send an extra header with every request.
    pub fn header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The root URL of the API.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn auth_token_value(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub(crate) fn request_timeout_value(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub(crate) fn extra_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[test]
fn from_vars_requires_a_url() {
    let err = ClientConfig::from_vars(|_| None).unwrap_err();
    assert_eq!(err.to_string(), "must specify FUEL_URL");
}

#[test]
fn from_vars_reads_token_and_timeout() {
    let config = ClientConfig::from_vars(|name| match name {
        URL_VAR => Some("http://10.20.0.2:8000/".to_owned()),
        AUTH_TOKEN_VAR => Some("abc".to_owned()),
        HTTP_TIMEOUT_VAR => Some("45".to_owned()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.url().as_str(), "http://10.20.0.2:8000/");
    assert_eq!(config.auth_token_value(), Some("abc"));
    assert_eq!(config.request_timeout_value(), Some(Duration::from_secs(45)));
}

#[test]
fn from_vars_rejects_a_bad_timeout() {
    let result = ClientConfig::from_vars(|name| match name {
        URL_VAR => Some("http://10.20.0.2:8000".to_owned()),
        HTTP_TIMEOUT_VAR => Some("soon".to_owned()),
        _ => None,
    });
    assert!(result.is_err());
}

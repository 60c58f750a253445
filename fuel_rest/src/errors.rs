//! Our error types.

#![allow(missing_docs)]

use reqwest::StatusCode;
use std::error::Error as StdError;
use std::result;
use thiserror::Error;
use url::Url;

use crate::transport::Method;

/// A custom `Result`, for convenience.
pub type Result<T, E = Error> = result::Result<T, E>;

/// An error talking to Fuel, or driving a Fuel operation to completion.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// We could not access the specified URL.
    #[non_exhaustive]
    #[error("error accessing '{url}': {source}")]
    CouldNotAccessUrl { url: Url, source: Box<Error> },

    /// We could not parse a URL.
    #[non_exhaustive]
    #[error("could not parse URL '{url}': {source}")]
    CouldNotParseUrl {
        url: String,
        source: Box<url::ParseError>,
    },

    /// A request with a method which does not allow a body was given one.
    #[non_exhaustive]
    #[error("{method} {path} may not carry a request body")]
    BodyNotAllowed { method: Method, path: String },

    /// A call was passed both an entire body object and individual fields.
    #[non_exhaustive]
    #[error("both an entire object and individual fields were passed to {template}")]
    ConflictingArguments { template: String },

    /// A URL placeholder resolved to something other than a string, number or
    /// boolean.
    #[non_exhaustive]
    #[error("placeholder {{{name}}} in {template} must be a scalar value")]
    InvalidParameter { name: String, template: String },

    /// A URL placeholder could not be found in either the explicit arguments
    /// or the attributes of the resource the call was bound to.
    #[non_exhaustive]
    #[error("no value for placeholder {{{name}}} in {template}")]
    MissingParameter { name: String, template: String },

    /// The user must specify the environment variable `var`.
    #[non_exhaustive]
    #[error("must specify {var}")]
    MissingEnvVar { var: String },

    /// A deployment task reported an error.
    #[non_exhaustive]
    #[error("task {task} failed: {message}")]
    TaskFailed {
        /// The name (or id) of the failing task.
        task: String,
        /// Whatever message the server attached to the task.
        message: String,
    },

    /// We gave up waiting for something.
    #[non_exhaustive]
    #[error("timeout during {description}")]
    Timeout {
        /// What we were waiting for.
        description: String,
    },

    /// We received an HTTP status code outside of the 200-209 range.
    #[non_exhaustive]
    #[error("{status} for {url} ({body})")]
    UnexpectedHttpStatus {
        url: Url,
        status: StatusCode,
        body: String,
    },

    /// The server answered, but not with what we expected.
    #[non_exhaustive]
    #[error("expected {expected} from {path}")]
    UnexpectedResponse { path: String, expected: &'static str },

    /// Another kind of error occurred.
    #[non_exhaustive]
    #[error("{source}")]
    Other {
        /// The original error.
        #[from]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl Error {
    /// Construct an `Error::CouldNotAccessUrl` value.
    pub(crate) fn could_not_access_url<E>(url: &Url, error: E) -> Error
    where
        E: Into<Error>,
    {
        Error::CouldNotAccessUrl {
            url: url.to_owned(),
            source: Box::new(error.into()),
        }
    }

    /// Construct an `Error::CouldNotParseUrl` value.
    pub(crate) fn could_not_parse_url<S>(url: S, error: url::ParseError) -> Error
    where
        S: Into<String>,
    {
        Error::CouldNotParseUrl {
            url: url.into(),
            source: Box::new(error),
        }
    }

    /// Construct an `Error::UnexpectedHttpStatus` value. Public so that other
    /// `Transport` implementations can report HTTP failures the same way.
    pub fn unexpected_http_status<S>(url: Url, status: StatusCode, body: S) -> Error
    where
        S: Into<String>,
    {
        Error::UnexpectedHttpStatus {
            url,
            status,
            body: body.into(),
        }
    }

    pub(crate) fn missing_parameter(name: &str, template: &str) -> Error {
        Error::MissingParameter {
            name: name.to_owned(),
            template: template.to_owned(),
        }
    }

    /// Construct a `MissingEnvVar` value.
    pub(crate) fn missing_env_var<S: Into<String>>(var: S) -> Self {
        Error::MissingEnvVar { var: var.into() }
    }

    pub(crate) fn timeout<S: Into<String>>(description: S) -> Self {
        Error::Timeout {
            description: description.into(),
        }
    }

    /// The HTTP status which caused this error, if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self.original_error() {
            Error::UnexpectedHttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Return the original error that caused this error, without any
    /// wrapper errors.
    pub fn original_error(&self) -> &Error {
        match self {
            Error::CouldNotAccessUrl { source, .. } => source.original_error(),

            Error::CouldNotParseUrl { .. }
            | Error::BodyNotAllowed { .. }
            | Error::ConflictingArguments { .. }
            | Error::InvalidParameter { .. }
            | Error::MissingParameter { .. }
            | Error::MissingEnvVar { .. }
            | Error::TaskFailed { .. }
            | Error::Timeout { .. }
            | Error::UnexpectedHttpStatus { .. }
            | Error::UnexpectedResponse { .. }
            | Error::Other { .. } => self,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Error {
        Error::Other {
            source: error.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Other {
            source: error.into(),
        }
    }
}

#[test]
fn status_code_is_found_through_wrappers() {
    let url = Url::parse("http://10.20.0.2:8000/api/clusters/7").unwrap();
    let inner = Error::unexpected_http_status(url.clone(), StatusCode::NOT_FOUND, "");
    let err = Error::could_not_access_url(&url, inner);
    assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
    assert_eq!(Error::timeout("deploy cluster").status_code(), None);
}

#[test]
fn timeout_message_names_what_we_waited_for() {
    let err = Error::timeout("wait deployment finished");
    assert_eq!(err.to_string(), "timeout during wait deployment finished");
}

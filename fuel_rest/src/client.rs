//! A client connection to Fuel.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::call::{Call, CallArgs};
use crate::config::ClientConfig;
use crate::errors::*;
use crate::resource::{self, Id, Partial, Resource, Updatable};
use crate::transport::{HttpTransport, Method, Transport};

/// A client connection to Fuel. Cloning a `Client` is cheap, and all clones
/// share the same transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a new `Client` talking HTTP to the server described by
    /// `config`.
    pub fn new(config: &ClientConfig) -> Result<Client> {
        Ok(Client::with_transport(HttpTransport::new(config)?))
    }

    /// Create a new `Client` using `ClientConfig::from_env`.
    pub fn from_env() -> Result<Client> {
        Client::new(&ClientConfig::from_env()?)
    }

    /// Create a new `Client` which sends requests through `transport`.
    pub fn with_transport<T>(transport: T) -> Client
    where
        T: Transport + 'static,
    {
        Client {
            transport: Arc::new(transport),
        }
    }

    /// Perform a single request. `GET` requests may not carry a body: an
    /// empty JSON object counts as no body, anything else is an error.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
    ) -> Result<Option<Value>> {
        let params = if method == Method::Get {
            if params.map_or(false, |p| !is_empty_params(p)) {
                return Err(Error::BodyNotAllowed {
                    method,
                    path: path.to_owned(),
                });
            }
            None
        } else {
            params
        };
        match params {
            Some(params) => debug!("{} {} {}", method, path, params),
            None => debug!("{} {}", method, path),
        }
        self.transport.request(method, path, params).await
    }

    /// `GET` the resource at `path`.
    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.request(Method::Get, path, None).await
    }

    /// `PUT` `params` to `path`.
    pub async fn put(&self, path: &str, params: &Value) -> Result<Option<Value>> {
        self.request(Method::Put, path, Some(params)).await
    }

    /// `POST` `params` to `path`.
    pub async fn post(&self, path: &str, params: &Value) -> Result<Option<Value>> {
        self.request(Method::Post, path, Some(params)).await
    }

    /// `PATCH` `path` with `params`.
    pub async fn patch(&self, path: &str, params: &Value) -> Result<Option<Value>> {
        self.request(Method::Patch, path, Some(params)).await
    }

    /// `DELETE` the resource at `path`.
    pub async fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.request(Method::Delete, path, None).await
    }

    /// `HEAD` the resource at `path`.
    pub async fn head(&self, path: &str) -> Result<Option<Value>> {
        self.request(Method::Head, path, None).await
    }

    /// Create a new resource.
    pub async fn create<Args>(&self, args: &Args) -> Result<Args::Resource>
    where
        Args: resource::Args,
    {
        let call = Call::post(Args::Resource::collection_path());
        let body = call
            .invoke(self, &(), CallArgs::new().entire(args)?)
            .await?;
        from_body(call.template(), body, "the created resource")
    }

    /// Fetch an existing resource.
    pub async fn fetch<R: Resource>(&self, id: &Id<R>) -> Result<R> {
        let call = Call::get(R::item_template());
        let body = call
            .invoke(self, &(), CallArgs::new().arg("id", id.to_value()))
            .await?;
        from_body(call.template(), body, "a resource")
    }

    /// Replace `resource` on the server with our local copy, sending every
    /// attribute we have. Use `update` to change only some fields.
    pub async fn replace<R: Resource>(&self, resource: &R) -> Result<Option<Value>> {
        debug!("replacing {} {}", R::type_name(), resource.id());
        Call::put(R::item_template())
            .invoke(self, resource, CallArgs::new().entire(resource)?)
            .await
    }

    /// Change only the fields set in `partial`. Use `replace` to send a whole
    /// resource.
    pub async fn update<R>(&self, partial: &Partial<R>) -> Result<Option<Value>>
    where
        R: Resource + Updatable,
    {
        debug!("updating {} {}: {:?}", R::type_name(), partial.id, partial.update);
        Call::put(R::item_template())
            .invoke(self, partial, CallArgs::new().entire(partial)?)
            .await
    }

    /// Apply several partial updates with a single request to the collection.
    pub async fn update_many<R>(&self, partials: &[Partial<R>]) -> Result<Option<Value>>
    where
        R: Resource + Updatable,
    {
        Call::put(R::collection_path())
            .invoke(self, &(), CallArgs::new().entire(partials)?)
            .await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish()
    }
}

/// Is this a body that a `GET` may carry, i.e. nothing at all?
fn is_empty_params(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Deserialize a response body from `path`, which must be present.
pub(crate) fn from_body<T>(path: &str, body: Option<Value>, expected: &'static str) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = body.ok_or_else(|| Error::UnexpectedResponse {
        path: path.to_owned(),
        expected,
    })?;
    serde_json::from_value(body).map_err(|e| {
        debug!("could not parse response from {}: {}", path, e);
        Error::UnexpectedResponse {
            path: path.to_owned(),
            expected,
        }
    })
}

#[test]
fn only_empty_objects_count_as_no_params() {
    use serde_json::json;

    assert!(is_empty_params(&json!({})));
    assert!(is_empty_params(&Value::Null));
    assert!(!is_empty_params(&json!({ "a": 1 })));
    assert!(!is_empty_params(&json!([])));
}

#[test]
fn missing_bodies_are_unexpected() {
    let err = from_body::<Vec<Value>>("api/nodes", None, "a list of nodes").unwrap_err();
    assert_eq!(err.to_string(), "expected a list of nodes from api/nodes");
}

//! Bind an HTTP method and a URL template to a resource, producing a call.
//!
//! A [`Call`] is declared once, usually as an associated constant on a
//! resource type:
//!
//! ```
//! use fuel_rest::call::Call;
//!
//! const START_DEPLOY: Call = Call::put("api/clusters/{id}/changes");
//! assert_eq!(START_DEPLOY.placeholders(), vec!["id"]);
//! ```
//!
//! When invoked, each `{placeholder}` is filled from an explicit argument of
//! the same name if there is one, and from the bound resource's attribute
//! otherwise. Explicit arguments which aren't placeholders become the JSON
//! body.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::client::Client;
use crate::errors::*;
use crate::resource::AttributeSource;
use crate::transport::Method;

lazy_static! {
    /// Matches `{name}` placeholders in URL templates.
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}")
        .expect("Cannot parse placeholder regex in source code");
}

/// An HTTP method plus a URL template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Call {
    method: Method,
    template: &'static str,
}

impl Call {
    /// Declare a call using `method` on `template`.
    pub const fn new(method: Method, template: &'static str) -> Call {
        Call { method, template }
    }

    /// Declare a `GET` call.
    pub const fn get(template: &'static str) -> Call {
        Call::new(Method::Get, template)
    }

    /// Declare a `PUT` call.
    pub const fn put(template: &'static str) -> Call {
        Call::new(Method::Put, template)
    }

    /// Declare a `POST` call.
    pub const fn post(template: &'static str) -> Call {
        Call::new(Method::Post, template)
    }

    /// Declare a `DELETE` call.
    pub const fn delete(template: &'static str) -> Call {
        Call::new(Method::Delete, template)
    }

    /// Declare a `PATCH` call.
    pub const fn patch(template: &'static str) -> Call {
        Call::new(Method::Patch, template)
    }

    /// Declare a `HEAD` call.
    pub const fn head(template: &'static str) -> Call {
        Call::new(Method::Head, template)
    }

    /// The HTTP method of this call.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The URL template of this call.
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// The placeholder names in our template, in order, without duplicates.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = vec![];
        for caps in PLACEHOLDER.captures_iter(self.template) {
            if let Some(name) = caps.get(1) {
                let name = name.as_str();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Resolve our placeholders and build the request body, without
    /// performing any I/O.
    pub fn bind<S>(&self, source: &S, args: CallArgs) -> Result<Request>
    where
        S: AttributeSource + ?Sized,
    {
        let CallArgs { mut params, entire } = args;
        if entire.is_some() && !params.is_empty() {
            return Err(Error::ConflictingArguments {
                template: self.template.to_owned(),
            });
        }

        let mut values = BTreeMap::new();
        for name in self.placeholders() {
            let value = params
                .remove(name)
                .filter(|v| !v.is_null())
                .or_else(|| source.attribute(name))
                .ok_or_else(|| Error::missing_parameter(name, self.template))?;
            values.insert(name, self.placeholder_text(name, &value)?);
        }
        let path = PLACEHOLDER
            .replace_all(self.template, |caps: &Captures<'_>| {
                // Every name was resolved above.
                values.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned();

        let body = match entire {
            Some(entire) => Some(entire),
            None if params.is_empty() && self.method == Method::Get => None,
            None => Some(Value::Object(params)),
        };
        Ok(Request {
            method: self.method,
            path,
            body,
        })
    }

    /// Bind this call against `source` and perform it using `client`,
    /// returning the parsed response body.
    pub async fn invoke<S>(
        &self,
        client: &Client,
        source: &S,
        args: CallArgs,
    ) -> Result<Option<Value>>
    where
        S: AttributeSource + ?Sized,
    {
        let request = self.bind(source, args)?;
        client
            .request(request.method, &request.path, request.body.as_ref())
            .await
    }

    fn placeholder_text(&self, name: &str, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(Error::InvalidParameter {
                name: name.to_owned(),
                template: self.template.to_owned(),
            }),
        }
    }
}

/// Explicit arguments to a `Call`: either individual named fields, or a single
/// pre-built body, but never both.
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    params: Map<String, Value>,
    entire: Option<Value>,
}

impl CallArgs {
    /// No explicit arguments.
    pub fn new() -> CallArgs {
        CallArgs::default()
    }

    /// Pass `name`. If `name` is a placeholder, it fills the placeholder and
    /// overrides any attribute of the same name. Otherwise it becomes a body
    /// field.
    pub fn arg<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Send `body` as the entire request body.
    pub fn entire<T>(mut self, body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        self.entire = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// A fully-resolved request, ready to hand to a `Transport`.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// The path, with all placeholders substituted.
    pub path: String,
    /// The JSON body, if any.
    pub body: Option<Value>,
}

#[cfg(test)]
fn cluster(id: u64) -> crate::resource::Cluster {
    crate::resource::Cluster::new(crate::resource::Id::from(id))
}

#[test]
fn placeholders_are_ordered_and_unique() {
    let call = Call::get("api/{kind}/{id}/x/{id}?q={other_thing}");
    assert_eq!(call.placeholders(), vec!["kind", "id", "other_thing"]);
    assert!(Call::get("api/nodes").placeholders().is_empty());
}

#[test]
fn placeholder_names_may_contain_digits() {
    let call = Call::get("api/x/{node_id2}");
    assert_eq!(call.placeholders(), vec!["node_id2"]);
    let req = call
        .bind(&(), CallArgs::new().arg("node_id2", 5))
        .unwrap();
    assert_eq!(req.path, "api/x/5");
    let err = call.bind(&(), CallArgs::new()).unwrap_err();
    assert!(matches!(err, Error::MissingParameter { .. }));
}

#[test]
fn placeholders_resolve_from_attributes() {
    let req = Call::put("api/clusters/{id}/changes")
        .bind(&cluster(7), CallArgs::new())
        .unwrap();
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.path, "api/clusters/7/changes");
    assert_eq!(req.body, Some(serde_json::json!({})));
    assert!(!req.path.contains('{') && !req.path.contains('}'));
}

#[test]
fn explicit_arguments_win_over_attributes() {
    let req = Call::put("api/clusters/{id}")
        .bind(&cluster(7), CallArgs::new().arg("id", 9).arg("name", "env"))
        .unwrap();
    assert_eq!(req.path, "api/clusters/9");
    // `id` was consumed by the path, so only `name` is left for the body.
    assert_eq!(req.body, Some(serde_json::json!({ "name": "env" })));
}

#[test]
fn unbound_calls_use_explicit_arguments() {
    let req = Call::get("/api/clusters/{id}/attributes/")
        .bind(&(), CallArgs::new().arg("id", 3))
        .unwrap();
    assert_eq!(req.path, "/api/clusters/3/attributes/");
    assert_eq!(req.body, None);
}

#[test]
fn attribute_maps_are_sources_too() {
    let mut attrs = crate::resource::Attributes::new();
    attrs.insert("release".to_owned(), serde_json::json!("2014.1"));
    let req = Call::get("api/releases/{release}")
        .bind(&attrs, CallArgs::new())
        .unwrap();
    assert_eq!(req.path, "api/releases/2014.1");
}

#[test]
fn missing_placeholders_are_errors() {
    let err = Call::get("api/clusters/{id}/{missing}")
        .bind(&cluster(1), CallArgs::new())
        .unwrap_err();
    match err {
        Error::MissingParameter { name, template } => {
            assert_eq!(name, "missing");
            assert_eq!(template, "api/clusters/{id}/{missing}");
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn null_attributes_count_as_missing() {
    // A fresh cluster has no name.
    let err = Call::get("api/by-name/{name}")
        .bind(&cluster(1), CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { .. }));
}

#[test]
fn entire_body_conflicts_with_fields() {
    let args = CallArgs::new()
        .arg("name", "x")
        .entire(&serde_json::json!([{ "id": 1 }]))
        .unwrap();
    let err = Call::put("api/nodes").bind(&(), args).unwrap_err();
    assert!(matches!(err, Error::ConflictingArguments { .. }));
}

#[test]
fn entire_body_is_sent_verbatim() {
    let args = CallArgs::new().entire(&serde_json::json!([{ "id": 1 }])).unwrap();
    let req = Call::put("api/clusters/{id}/nodes").bind(&cluster(2), args).unwrap();
    assert_eq!(req.path, "api/clusters/2/nodes");
    assert_eq!(req.body, Some(serde_json::json!([{ "id": 1 }])));
}

#[test]
fn non_scalar_placeholders_are_rejected() {
    let err = Call::get("api/nodes/{id}")
        .bind(&(), CallArgs::new().arg("id", serde_json::json!([1, 2])))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));
}

//! A scripted stand-in for the Fuel server.

#![allow(dead_code)]

use async_trait::async_trait;
use fuel_rest::{Client, Error, Method, Result, Transport};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use url::Url;

/// A canned reply to a request.
#[derive(Clone, Debug)]
pub enum Reply {
    /// A successful response, with or without a body.
    Body(Option<Value>),
    /// An HTTP error status.
    Status(u16),
}

/// A request which reached the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Script {
    replies: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<Recorded>,
}

/// Answers requests from a script keyed by method and path. Each key holds a
/// queue of replies; the last reply in a queue is repeated forever. Requests
/// with no scripted reply panic, so tests notice unexpected traffic.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> ScriptedTransport {
        ScriptedTransport::default()
    }

    /// A `Client` sharing this transport's script.
    pub fn client(&self) -> Client {
        Client::with_transport(self.clone())
    }

    /// Queue `reply` for `method` on `path`.
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        let mut script = self.script.lock().unwrap();
        script
            .replies
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a JSON body for `method` on `path`.
    pub fn json(&self, method: Method, path: &str, body: Value) -> &Self {
        self.on(method, path, Reply::Body(Some(body)))
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.script.lock().unwrap().requests.clone()
    }

    /// The requests seen so far using `method`.
    pub fn requests_with(&self, method: Method) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
    ) -> Result<Option<Value>> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(Recorded {
            method,
            path: path.to_owned(),
            body: params.cloned(),
        });
        let queue = script
            .replies
            .get_mut(&(method, path.to_owned()))
            .unwrap_or_else(|| panic!("unscripted request: {} {}", method, path));
        let reply = if queue.len() > 1 {
            queue.pop_front().expect("queue is not empty")
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| panic!("no replies left for {} {}", method, path))
        };
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(code) => {
                let url = Url::parse("http://fuel.test/")
                    .and_then(|root| root.join(path.trim_start_matches('/')))
                    .expect("test URL should parse");
                let status = StatusCode::from_u16(code).expect("valid test status");
                Err(Error::unexpected_http_status(url, status, ""))
            }
        }
    }
}

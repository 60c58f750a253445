//! OpenStack environments ("clusters") managed by Fuel.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::*;
use super::{describe, Attributes, NodeList, Resource, Task, Updatable};
use crate::call::{Call, CallArgs};
use crate::client::{from_body, Client};
use crate::errors::*;

/// The deployment status of a cluster.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    /// Nothing has been deployed yet.
    New,
    /// A deployment is in progress.
    Deployment,
    /// The last deployment finished and the cluster is usable.
    Operational,
    /// The last deployment failed.
    Error,
    /// The cluster is being removed.
    Remove,
    /// The cluster is being updated.
    Update,
    /// A deployment was stopped.
    Stopped,
    /// A status we don't know about.
    #[serde(other)]
    Unknown,
}

/// A cluster, also known as an environment.
#[derive(Clone, Debug, Deserialize, Resource, Serialize, Updatable)]
#[api_name = "clusters"]
pub struct Cluster {
    /// The ID of this cluster.
    pub id: Id<Cluster>,

    /// The human-readable name of this cluster.
    #[serde(default)]
    #[updatable]
    pub name: Option<String>,

    /// The deployment status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,

    /// The deployment mode, such as `"ha_compact"` or `"multinode"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[updatable]
    pub mode: Option<String>,

    /// The ID of the OpenStack release deployed by this cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<Value>,

    /// The network provider, such as `"nova_network"` or `"neutron"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_provider: Option<String>,

    /// Everything else Fuel told us about this cluster.
    #[serde(flatten)]
    pub attributes: Attributes,

    /// The nodes we've added to this cluster. This is local bookkeeping: it's
    /// never sent to the server or refreshed from it.
    #[serde(skip)]
    pub nodes: NodeList,
}

impl Cluster {
    /// Add nodes (as a list of partial updates) to clusters.
    pub const ADD_NODES: Call = Call::put("api/nodes");
    /// Deploy all pending changes.
    pub const START_DEPLOY: Call = Call::put("api/clusters/{id}/changes");
    /// Fetch the current state of this cluster.
    pub const GET_STATUS: Call = Call::get("api/clusters/{id}");
    /// Delete this cluster.
    pub const DELETE: Call = Call::delete("api/clusters/{id}");
    /// Fetch the tasks for this cluster.
    pub const GET_TASKS_STATUS: Call = Call::get("api/tasks?tasks={id}");
    /// Fetch the nodes assigned to this cluster.
    pub const LOAD_NODES: Call = Call::get("api/nodes?cluster_id={id}");
    /// Fetch the settings of the cluster passed as the `id` argument.
    pub const GET_ATTRIBUTES: Call = Call::get("/api/clusters/{id}/attributes/");
    /// Replace the settings of the cluster passed as the `id` argument.
    pub const PUT_ATTRIBUTES: Call = Call::put("/api/clusters/{id}/attributes/");

    /// Create a local placeholder for the cluster `id`, with no known nodes.
    pub fn new(id: Id<Cluster>) -> Cluster {
        Cluster {
            id,
            name: None,
            status: None,
            mode: None,
            release_id: None,
            net_provider: None,
            attributes: Attributes::new(),
            nodes: NodeList::new(),
        }
    }

    /// Is this cluster operational?
    pub fn is_operational(&self) -> bool {
        self.status == Some(ClusterStatus::Operational)
    }

    /// Ask Fuel to deploy all pending changes to this cluster.
    pub async fn start_deploy(&self, client: &Client) -> Result<Option<Value>> {
        Self::START_DEPLOY.invoke(client, self, CallArgs::new()).await
    }

    /// Fetch a fresh copy of this cluster from the server. The copy has no
    /// local nodes.
    pub async fn get_status(&self, client: &Client) -> Result<Cluster> {
        let call = Self::GET_STATUS;
        let body = call.invoke(client, self, CallArgs::new()).await?;
        from_body(call.template(), body, "a cluster")
    }

    /// Delete this cluster on the server.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        Self::DELETE.invoke(client, self, CallArgs::new()).await?;
        Ok(())
    }

    /// Fetch all the tasks which Fuel reports for this cluster.
    pub async fn get_tasks_status(&self, client: &Client) -> Result<Vec<Task>> {
        let call = Self::GET_TASKS_STATUS;
        let body = call.invoke(client, self, CallArgs::new()).await?;
        from_body(call.template(), body, "a list of tasks")
    }

    /// Fetch the nodes which the server says belong to this cluster.
    pub async fn load_nodes(&self, client: &Client) -> Result<NodeList> {
        let call = Self::LOAD_NODES;
        let body = call.invoke(client, self, CallArgs::new()).await?;
        let nodes: Vec<super::Node> = from_body(call.template(), body, "a list of nodes")?;
        Ok(NodeList::from(nodes))
    }

    /// Does this cluster still exist on the server?
    pub async fn check_exists(&self, client: &Client) -> Result<bool> {
        match Self::GET_STATUS.invoke(client, self, CallArgs::new()).await {
            Ok(_) => Ok(true),
            Err(ref err) if err.status_code() == Some(StatusCode::NOT_FOUND) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Fetch the settings of the cluster `id`.
    pub async fn attributes(client: &Client, id: &Id<Cluster>) -> Result<Value> {
        let call = Self::GET_ATTRIBUTES;
        let args = CallArgs::new().arg("id", id.to_value());
        let body = call.invoke(client, &(), args).await?;
        body.ok_or_else(|| Error::UnexpectedResponse {
            path: call.template().to_owned(),
            expected: "cluster attributes",
        })
    }

    /// Replace the settings of the cluster `id` with `attrs`.
    pub async fn update_attributes(
        client: &Client,
        id: &Id<Cluster>,
        attrs: &Value,
    ) -> Result<Option<Value>> {
        // `attrs` is an object, so we could pass it as individual fields, but
        // that would let a top-level `id` key collide with the placeholder.
        let request = Self::PUT_ATTRIBUTES.bind(&(), CallArgs::new().arg("id", id.to_value()))?;
        client
            .request(request.method, &request.path, Some(attrs))
            .await
    }
}

/// Arguments used to create a cluster.
#[derive(Debug, Serialize)]
pub struct Args {
    /// The name of the new cluster.
    pub name: String,

    /// The ID of the release to deploy.
    pub release: Value,

    /// The deployment mode.
    pub mode: String,

    /// The network provider.
    pub net_provider: String,

    /// Nodes to start with. Always empty; use `Orchestrator::add_node`.
    nodes: Vec<Value>,

    /// Tasks to start with. Always empty.
    tasks: Vec<Value>,
}

impl Args {
    /// Create a new `Args` for an empty cluster.
    pub fn new<N, M, P>(name: N, release: Value, mode: M, net_provider: P) -> Args
    where
        N: Into<String>,
        M: Into<String>,
        P: Into<String>,
    {
        Args {
            name: name.into(),
            release,
            mode: mode.into(),
            net_provider: net_provider.into(),
            nodes: vec![],
            tasks: vec![],
        }
    }
}

impl super::Args for Args {
    type Resource = Cluster;
}

#[test]
fn cluster_status_parses_known_and_unknown_values() {
    let cluster: Cluster =
        serde_json::from_str(r#"{"id": 1, "name": "env", "status": "operational"}"#)
            .unwrap();
    assert!(cluster.is_operational());
    let cluster: Cluster =
        serde_json::from_str(r#"{"id": 1, "status": "deploying"}"#).unwrap();
    assert_eq!(cluster.status, Some(ClusterStatus::Unknown));
    assert!(!cluster.is_operational());
}

#[test]
fn local_nodes_are_never_serialized() {
    use super::Node;

    let mut cluster = Cluster::new(Id::from(1));
    cluster.nodes.push(Node::new(Id::from(4)));
    let json = serde_json::to_value(&cluster).unwrap();
    assert!(json.get("nodes").is_none());
    assert_eq!(json["id"], serde_json::json!(1));
}

#[test]
fn create_args_start_empty() {
    let args = Args::new("env", Value::from(2), "ha_compact", "neutron");
    assert_eq!(
        serde_json::to_value(&args).unwrap(),
        serde_json::json!({
            "name": "env",
            "release": 2,
            "mode": "ha_compact",
            "net_provider": "neutron",
            "nodes": [],
            "tasks": []
        })
    );
}

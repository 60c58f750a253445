//! Nodes managed by Fuel.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use super::id::*;
use super::{describe, Attributes, Cluster, Partial, Resource, Updatable};
use crate::call::{Call, CallArgs};
use crate::client::Client;
use crate::errors::*;

/// A physical or virtual machine known to Fuel.
#[derive(Clone, Debug, Deserialize, Resource, Serialize, Updatable)]
#[api_name = "nodes"]
pub struct Node {
    /// The ID of this node.
    pub id: Id<Node>,

    /// The human-readable name of this node.
    #[serde(default)]
    #[updatable]
    pub name: String,

    /// The roles this node has been deployed with.
    #[serde(default)]
    pub roles: Vec<String>,

    /// The roles this node will have after the next deployment.
    #[serde(default)]
    #[updatable]
    pub pending_roles: Vec<String>,

    /// Will this node be added to its cluster by the next deployment?
    #[serde(default)]
    #[updatable]
    pub pending_addition: bool,

    /// The cluster this node belongs to, if any. Fuel reports this as
    /// `cluster`, but expects `cluster_id` in updates.
    #[serde(default)]
    #[updatable(attr(serde(rename = "cluster_id")))]
    pub cluster: Option<Id<Cluster>>,

    /// The provisioning status, such as `"discover"` or `"ready"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Everything else Fuel told us about this node.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Node {
    /// Bulk update of node fields. Note that this path lacks the `api/`
    /// prefix.
    pub const UPDATE_NODES: Call = Call::put("nodes");

    /// Create a local placeholder for the node `id`.
    pub fn new(id: Id<Node>) -> Node {
        Node {
            id,
            name: String::new(),
            roles: vec![],
            pending_roles: vec![],
            pending_addition: false,
            cluster: None,
            status: None,
            attributes: Attributes::new(),
        }
    }

    /// Does this node have `role`, either deployed or pending?
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().chain(self.pending_roles.iter()).any(|r| r == role)
    }

    /// Rename this node on the server.
    pub async fn set_name(&self, client: &Client, name: &str) -> Result<()> {
        let update = Partial::<Node>::new(
            self.id.clone(),
            NodeUpdate {
                name: Some(name.to_owned()),
                ..NodeUpdate::default()
            },
        );
        let args = CallArgs::new().entire(&[update])?;
        Self::UPDATE_NODES.invoke(client, self, args).await?;
        Ok(())
    }
}

/// An ordered list of nodes, as remembered by a `Cluster`.
#[derive(Clone, Debug, Default)]
pub struct NodeList(Vec<Node>);

impl NodeList {
    /// Create an empty list.
    pub fn new() -> NodeList {
        NodeList(vec![])
    }

    /// All nodes with `role`, in order.
    pub fn with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.0.iter().filter(move |node| node.has_role(role))
    }

    /// All controller nodes.
    pub fn controllers(&self) -> impl Iterator<Item = &Node> {
        self.with_role("controller")
    }

    /// All compute nodes.
    pub fn computes(&self) -> impl Iterator<Item = &Node> {
        self.with_role("compute")
    }

    /// All block storage nodes.
    pub fn cinders(&self) -> impl Iterator<Item = &Node> {
        self.with_role("cinder")
    }
}

impl Deref for NodeList {
    type Target = Vec<Node>;

    fn deref(&self) -> &Vec<Node> {
        &self.0
    }
}

impl DerefMut for NodeList {
    fn deref_mut(&mut self) -> &mut Vec<Node> {
        &mut self.0
    }
}

impl From<Vec<Node>> for NodeList {
    fn from(nodes: Vec<Node>) -> NodeList {
        NodeList(nodes)
    }
}

#[test]
fn node_keeps_unknown_attributes() {
    use serde_json::json;
    let node: Node = serde_json::from_value(json!({
        "id": 3,
        "name": "slave-03",
        "roles": ["controller"],
        "mac": "52:54:00:aa:bb:03",
        "online": true
    }))
    .unwrap();
    assert_eq!(node.id, Id::from(3));
    assert!(node.has_role("controller"));
    assert_eq!(node.attributes["mac"], json!("52:54:00:aa:bb:03"));
    assert_eq!(
        serde_json::to_value(&node).unwrap()["online"],
        json!(true)
    );
}

#[test]
fn node_update_only_sends_fields_that_were_set() {
    use serde_json::json;
    let update = Partial::<Node>::new(
        Id::from(4),
        NodeUpdate {
            pending_roles: Some(vec!["compute".to_owned()]),
            pending_addition: Some(true),
            cluster: Some(Some(Id::from(1))),
            ..NodeUpdate::default()
        },
    );
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({
            "id": 4,
            "pending_roles": ["compute"],
            "pending_addition": true,
            "cluster_id": 1
        })
    );
}

#[test]
fn display_puts_name_and_id_first() {
    use serde_json::json;
    let mut node = Node::new(Id::from(5));
    node.name = "slave-05".to_owned();
    node.attributes.insert("mac".to_owned(), json!("aa"));
    let text = node.to_string();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Node(slave-05):"));
    assert_eq!(lines.next(), Some("    id=5"));
    let rest: Vec<&str> = lines.collect();
    let mut sorted = rest.clone();
    sorted.sort();
    assert_eq!(rest, sorted);
    assert!(rest.contains(&"    mac=\"aa\""));
}

#[test]
fn node_list_filters_by_role() {
    let mut controller = Node::new(Id::from(1));
    controller.roles = vec!["controller".to_owned()];
    let mut compute = Node::new(Id::from(2));
    compute.pending_roles = vec!["compute".to_owned()];
    let nodes = NodeList::from(vec![controller, compute]);
    let ids: Vec<_> = nodes.computes().map(|n| n.id.clone()).collect();
    assert_eq!(ids, vec![Id::from(2)]);
    assert_eq!(nodes.controllers().count(), 1);
    assert_eq!(nodes.cinders().count(), 0);
}

//! Requests built by `Client`, `Call` and the resource types.

mod common;

use common::{Reply, ScriptedTransport};
use fuel_rest::call::CallArgs;
use fuel_rest::resource::node::NodeUpdate;
use fuel_rest::resource::{Cluster, Id, Node, Partial};
use fuel_rest::{Error, Method};
use serde_json::json;

#[tokio::test]
async fn find_by_name_returns_the_first_match() {
    let server = ScriptedTransport::new();
    server.json(
        Method::Get,
        "api/clusters",
        json!([
            { "id": 1, "name": "a" },
            { "id": 2, "name": "b" },
            { "id": 3, "name": "b" }
        ]),
    );
    let client = server.client();

    let found = client.find_by_name::<Cluster>("b").await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(Id::from(2)));
    assert!(client.find_by_name::<Cluster>("c").await.unwrap().is_none());
    assert_eq!(client.get_cluster_id("a").await.unwrap(), Some(Id::from(1)));
}

#[tokio::test]
async fn get_requests_may_not_carry_params() {
    let server = ScriptedTransport::new();
    let client = server.client();

    let err = client
        .request(Method::Get, "api/nodes", Some(&json!({ "cluster_id": 1 })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BodyNotAllowed { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn empty_get_params_are_dropped() {
    let server = ScriptedTransport::new();
    server.json(Method::Get, "api/nodes", json!([]));
    let client = server.client();

    client
        .request(Method::Get, "api/nodes", Some(&json!({})))
        .await
        .unwrap();
    assert_eq!(server.requests()[0].body, None);
}

#[tokio::test]
async fn binding_failures_never_reach_the_server() {
    let server = ScriptedTransport::new();
    let client = server.client();

    let err = Cluster::GET_STATUS
        .invoke(&client, &(), CallArgs::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { .. }));

    let args = CallArgs::new()
        .arg("id", 1)
        .entire(&json!([{ "id": 4 }]))
        .unwrap();
    let err = Cluster::ADD_NODES.invoke(&client, &(), args).await.unwrap_err();
    assert!(matches!(err, Error::ConflictingArguments { .. }));

    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn check_exists_maps_not_found_to_false() {
    let server = ScriptedTransport::new();
    server
        .json(Method::Get, "api/clusters/1", json!({ "id": 1 }))
        .on(Method::Get, "api/clusters/2", Reply::Status(404))
        .on(Method::Get, "api/clusters/3", Reply::Status(500));
    let client = server.client();

    assert!(Cluster::new(Id::from(1)).check_exists(&client).await.unwrap());
    assert!(!Cluster::new(Id::from(2)).check_exists(&client).await.unwrap());
    let err = Cluster::new(Id::from(3))
        .check_exists(&client)
        .await
        .unwrap_err();
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(500));
}

#[tokio::test]
async fn replace_sends_everything_but_update_sends_only_changes() {
    let server = ScriptedTransport::new();
    server.on(Method::Put, "api/nodes/3", Reply::Body(None));
    let client = server.client();

    let mut node = Node::new(Id::from(3));
    node.name = "slave-03".to_owned();
    node.roles = vec!["compute".to_owned()];
    client.replace(&node).await.unwrap();

    let partial = Partial::<Node>::new(
        Id::from(3),
        NodeUpdate {
            name: Some("renamed".to_owned()),
            ..NodeUpdate::default()
        },
    );
    client.update(&partial).await.unwrap();

    let puts = server.requests_with(Method::Put);
    assert_eq!(puts.len(), 2);
    assert_eq!(
        puts[0].body,
        Some(json!({
            "id": 3,
            "name": "slave-03",
            "roles": ["compute"],
            "pending_roles": [],
            "pending_addition": false,
            "cluster": null
        }))
    );
    assert_eq!(puts[1].body, Some(json!({ "id": 3, "name": "renamed" })));
}

#[tokio::test]
async fn set_name_uses_the_bulk_node_endpoint() {
    let server = ScriptedTransport::new();
    server.on(Method::Put, "nodes", Reply::Body(None));
    let client = server.client();

    Node::new(Id::from(8))
        .set_name(&client, "storage-1")
        .await
        .unwrap();
    assert_eq!(
        server.requests()[0].body,
        Some(json!([{ "id": 8, "name": "storage-1" }]))
    );
}

#[tokio::test]
async fn reflected_clusters_know_their_nodes() {
    let server = ScriptedTransport::new();
    server.json(
        Method::Get,
        "api/nodes?cluster_id=6",
        json!([
            { "id": 1, "name": "a", "roles": ["controller"], "cluster": 6 },
            { "id": 2, "name": "b", "pending_roles": ["compute"], "cluster": 6 }
        ]),
    );
    let client = server.client();

    let cluster = client.reflect_cluster(Id::from(6)).await.unwrap();
    assert_eq!(cluster.nodes.len(), 2);
    assert_eq!(cluster.nodes.controllers().count(), 1);
    assert_eq!(cluster.nodes.computes().count(), 1);
    assert_eq!(cluster.nodes[1].cluster, Some(Id::from(6)));
}

#[tokio::test]
async fn unexpected_bodies_are_reported() {
    let server = ScriptedTransport::new();
    server.on(Method::Get, "api/clusters/9", Reply::Body(None));
    let client = server.client();

    let err = Cluster::new(Id::from(9))
        .get_status(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn delete_issues_a_delete_on_the_cluster() {
    let server = ScriptedTransport::new();
    server.on(Method::Delete, "api/clusters/4", Reply::Body(None));
    let client = server.client();

    Cluster::new(Id::from(4)).delete(&client).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Delete);
    assert_eq!(requests[0].path, "api/clusters/4");
}

#[tokio::test]
async fn fetch_gets_the_item_path_without_a_body() {
    let server = ScriptedTransport::new();
    server.json(
        Method::Get,
        "api/nodes/3",
        json!({ "id": 3, "name": "slave-03", "roles": ["compute"] }),
    );
    let client = server.client();

    let node = client.fetch::<Node>(&Id::from(3)).await.unwrap();
    assert_eq!(node.id, Id::from(3));
    assert_eq!(node.name, "slave-03");
    assert!(node.has_role("compute"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, None);
}

#[tokio::test]
async fn update_many_puts_a_list_of_partials_to_the_collection() {
    let server = ScriptedTransport::new();
    server.on(Method::Put, "api/nodes", Reply::Body(None));
    let client = server.client();

    let partials = vec![
        Partial::<Node>::new(
            Id::from(1),
            NodeUpdate {
                name: Some("a".to_owned()),
                ..NodeUpdate::default()
            },
        ),
        Partial::<Node>::new(
            Id::from(2),
            NodeUpdate {
                pending_addition: Some(true),
                ..NodeUpdate::default()
            },
        ),
    ];
    client.update_many(&partials).await.unwrap();

    let puts = server.requests_with(Method::Put);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].path, "api/nodes");
    assert_eq!(
        puts[0].body,
        Some(json!([
            { "id": 1, "name": "a" },
            { "id": 2, "pending_addition": true }
        ]))
    );
}

//! Driving clusters through creation and deployment against a scripted
//! server.

mod common;

use common::{Reply, ScriptedTransport};
use fuel_rest::resource::{Cluster, Id, Node};
use fuel_rest::{ClusterDescription, Error, Method, Observer, Orchestrator};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Remembers every `info` message.
#[derive(Clone, Default)]
struct RecordingObserver {
    infos: Arc<Mutex<Vec<String>>>,
}

impl Observer for RecordingObserver {
    fn debug(&self, _message: &str) {}

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_owned());
    }
}

fn attributes() -> serde_json::Value {
    json!({
        "editable": {
            "common": { "debug": { "value": false } },
            "storage": { "volumes_ceph": { "value": false } },
            "additional_components": { "sahara": { "value": false } }
        }
    })
}

#[tokio::test(start_paused = true)]
async fn deploy_waits_for_status_then_tasks() {
    let server = ScriptedTransport::new();
    server
        .on(Method::Put, "api/clusters/1/changes", Reply::Body(None))
        .json(Method::Get, "api/clusters/1", json!({ "id": 1, "status": "deploying" }))
        .json(Method::Get, "api/clusters/1", json!({ "id": 1, "status": "deploying" }))
        .json(Method::Get, "api/clusters/1", json!({ "id": 1, "status": "operational" }))
        .json(Method::Get, "api/tasks?tasks=1", json!([{ "name": "deploy", "status": "running" }]))
        .json(Method::Get, "api/tasks?tasks=1", json!([{ "name": "deploy", "status": "ready" }]));
    let orchestrator = Orchestrator::new(server.client());

    let start = Instant::now();
    orchestrator
        .deploy(&Cluster::new(Id::from(1)), HOUR)
        .await
        .unwrap();

    // Three status polls one second apart, then two task polls.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    let paths = server
        .requests()
        .into_iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![
            "PUT api/clusters/1/changes",
            "GET api/clusters/1",
            "GET api/clusters/1",
            "GET api/clusters/1",
            "GET api/tasks?tasks=1",
            "GET api/tasks?tasks=1",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_tasks_fail_the_deploy() {
    let server = ScriptedTransport::new();
    server
        .on(Method::Put, "api/clusters/1/changes", Reply::Body(None))
        .json(Method::Get, "api/clusters/1", json!({ "id": 1, "status": "operational" }))
        .json(
            Method::Get,
            "api/tasks?tasks=1",
            json!([
                { "name": "provision", "status": "ready" },
                { "name": "deploy", "status": "error", "message": "puppet failed" }
            ]),
        );
    let orchestrator = Orchestrator::new(server.client());

    let err = orchestrator
        .deploy(&Cluster::new(Id::from(1)), HOUR)
        .await
        .unwrap_err();
    match err {
        Error::TaskFailed { task, message, .. } => {
            assert_eq!(task, "deploy");
            assert_eq!(message, "puppet failed");
        }
        other => panic!("unexpected error {}", other),
    }
    // We gave up on the first task poll.
    assert_eq!(server.requests_with(Method::Get).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn waiting_for_operational_times_out() {
    let server = ScriptedTransport::new();
    server.json(Method::Get, "api/clusters/1", json!({ "id": 1, "status": "deployment" }));
    let orchestrator = Orchestrator::new(server.client());

    let start = Instant::now();
    let err = orchestrator
        .wait_operational(&Cluster::new(Id::from(1)), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { ref description, .. } if description == "deploy cluster"));
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert!(start.elapsed() < Duration::from_secs(6));
}

#[tokio::test]
async fn add_node_sends_one_update_and_remembers_the_node() {
    let server = ScriptedTransport::new();
    server.on(Method::Put, "api/nodes", Reply::Body(None));
    let orchestrator = Orchestrator::new(server.client());

    let mut cluster = Cluster::new(Id::from(1));
    let node = Node::new(Id::from(4));
    orchestrator
        .add_node(&mut cluster, &node, vec!["controller", "cinder"])
        .await
        .unwrap();

    let puts = server.requests_with(Method::Put);
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts[0].body,
        Some(json!([{
            "id": 4,
            "pending_roles": ["controller", "cinder"],
            "pending_addition": true,
            "cluster_id": 1
        }]))
    );
    assert_eq!(cluster.nodes.len(), 1);
    assert_eq!(cluster.nodes[0].id, Id::from(4));
    // The local copy is the node as we were given it.
    assert!(cluster.nodes.controllers().next().is_none());
}

#[tokio::test]
async fn existing_clusters_are_reused() {
    let server = ScriptedTransport::new();
    server.json(
        Method::Get,
        "api/clusters",
        json!([{ "id": 1, "name": "other" }, { "id": 2, "name": "env" }]),
    );
    let observer = RecordingObserver::default();
    let orchestrator = Orchestrator::new(server.client()).observer(observer.clone());

    let description = ClusterDescription::new("env", json!(3), "ha_compact", "neutron");
    let cluster = orchestrator.create_empty_cluster(&description).await.unwrap();

    assert_eq!(cluster.id, Id::from(2));
    assert_eq!(server.requests().len(), 1);
    let infos = observer.infos.lock().unwrap();
    assert!(infos.iter().any(|m| m == "cluster id is 2"));
}

#[tokio::test]
async fn new_clusters_are_created_and_configured() {
    let server = ScriptedTransport::new();
    server
        .json(Method::Get, "api/clusters", json!([]))
        .json(
            Method::Post,
            "api/clusters",
            json!({ "id": 5, "name": "env", "status": "new" }),
        )
        .json(Method::Get, "/api/clusters/5/attributes/", attributes())
        .on(Method::Put, "/api/clusters/5/attributes/", Reply::Body(None));
    let orchestrator = Orchestrator::new(server.client());

    let description = ClusterDescription::new("env", json!(3), "ha_compact", "neutron")
        .setting("volumes_ceph", true)
        .debug(false);
    let cluster = orchestrator.create_empty_cluster(&description).await.unwrap();
    assert_eq!(cluster.id, Id::from(5));
    assert!(cluster.nodes.is_empty());

    let posts = server.requests_with(Method::Post);
    assert_eq!(
        posts[0].body,
        Some(json!({
            "name": "env",
            "release": 3,
            "mode": "ha_compact",
            "net_provider": "neutron",
            "nodes": [],
            "tasks": []
        }))
    );

    let puts = server.requests_with(Method::Put);
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts[0].body,
        Some(json!({
            "editable": {
                "common": { "debug": { "value": false } },
                "storage": { "volumes_ceph": { "value": true } },
                "additional_components": { "sahara": { "value": false } }
            }
        }))
    );
}

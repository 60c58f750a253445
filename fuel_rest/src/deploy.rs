//! Drive cluster creation and deployment to completion.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::call::CallArgs;
use crate::client::Client;
use crate::errors::*;
use crate::observer::{Observer, TracingObserver};
use crate::resource::cluster::{self, Cluster};
use crate::resource::node::{Node, NodeUpdate};
use crate::resource::{Partial, Task};
use crate::wait::poll;

/// The environment variable controlling whether new clusters are deployed
/// with debug logging.
pub const DEBUG_MODE_VAR: &str = "DEBUG_MODE";

/// Everything we need to know to create a cluster.
#[derive(Clone, Debug, Deserialize)]
pub struct ClusterDescription {
    /// The name of the cluster.
    pub name: String,

    /// The release to deploy.
    pub release: Value,

    /// The deployment mode, such as `"ha_compact"`.
    pub deployment_mode: String,

    /// The network provider, such as `"neutron"`.
    pub net_provider: String,

    /// Settings to copy into the cluster's editable attributes. Options we
    /// don't know how to place are ignored.
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Should OpenStack services log at debug level?
    #[serde(default = "default_debug")]
    pub debug: bool,
}

fn default_debug() -> bool {
    true
}

impl ClusterDescription {
    /// Describe a cluster with no extra settings and debug logging enabled.
    pub fn new<N, M, P>(name: N, release: Value, deployment_mode: M, net_provider: P) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        P: Into<String>,
    {
        ClusterDescription {
            name: name.into(),
            release,
            deployment_mode: deployment_mode.into(),
            net_provider: net_provider.into(),
            settings: Map::new(),
            debug: default_debug(),
        }
    }

    /// Add a setting, such as `("volumes_ceph", true)`.
    pub fn setting<S, V>(mut self, option: S, value: V) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.settings.insert(option.into(), value.into());
        self
    }

    /// Enable or disable debug logging.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Take the debug flag from `DEBUG_MODE`, which counts as enabled unless
    /// set to something other than `true`.
    pub fn debug_from_env(self) -> Self {
        let debug = env::var(DEBUG_MODE_VAR).map_or(true, |v| v == "true");
        self.debug(debug)
    }
}

/// The section of a cluster's editable attributes which holds `option`.
pub fn settings_section(option: &str) -> Option<&'static str> {
    match option {
        "sahara" | "murano" | "ceilometer" => Some("additional_components"),
        "volumes_ceph" | "images_ceph" | "ephemeral_ceph" | "objects_ceph"
        | "osd_pool_size" | "volumes_lvm" | "volumes_vmdk" => Some("storage"),
        "tenant" | "password" | "user" => Some("access"),
        "vc_password" | "cluster" | "host_ip" | "vc_user" | "use_vcenter" => {
            Some("vcenter")
        }
        _ => None,
    }
}

/// Copy `description`'s settings and debug flag into `attributes`, as
/// returned by `Cluster::attributes`.
fn apply_settings(attributes: &mut Value, description: &ClusterDescription) -> Result<()> {
    for (option, value) in &description.settings {
        if let Some(section) = settings_section(option) {
            *editable_value(attributes, section, option)? = value.clone();
        }
    }
    *editable_value(attributes, "common", "debug")? = Value::Bool(description.debug);
    Ok(())
}

/// Find `editable.<section>.<option>.value`. The option itself must already
/// exist; `value` is created if missing.
fn editable_value<'a>(
    attributes: &'a mut Value,
    section: &str,
    option: &str,
) -> Result<&'a mut Value> {
    let option_obj = attributes
        .get_mut("editable")
        .and_then(|editable| editable.get_mut(section))
        .and_then(|section| section.get_mut(option))
        .and_then(|option| option.as_object_mut())
        .ok_or_else(|| Error::UnexpectedResponse {
            path: Cluster::GET_ATTRIBUTES.template().to_owned(),
            expected: "editable cluster settings",
        })?;
    Ok(option_obj.entry("value").or_insert(Value::Null))
}

/// Are all `tasks` ready? Fails as soon as we see a task with an error, but
/// otherwise looks at every task.
pub fn all_tasks_finished_ok(tasks: &[Task]) -> Result<bool> {
    let mut ok = true;
    for task in tasks {
        if task.status.is_err() {
            return Err(Error::TaskFailed {
                task: task.label(),
                message: task
                    .message
                    .clone()
                    .unwrap_or_else(|| "Task execution error".to_owned()),
            });
        } else if !task.status.is_ready() {
            ok = false;
        }
    }
    Ok(ok)
}

/// Sequences calls and waits to take a cluster through its lifecycle.
///
/// Every operation runs on the caller's task, one request at a time.
#[derive(Clone)]
pub struct Orchestrator {
    client: Client,
    observer: Arc<dyn Observer>,
}

impl Orchestrator {
    /// Create an orchestrator which reports progress via `tracing`.
    pub fn new(client: Client) -> Orchestrator {
        Orchestrator {
            client,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Report progress to `observer` instead.
    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: Observer + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// The client we use to talk to Fuel.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Find the cluster called `description.name`, or create it.
    ///
    /// New clusters are created empty, then have their editable attributes
    /// updated from `description`.
    pub async fn create_empty_cluster(
        &self,
        description: &ClusterDescription,
    ) -> Result<Cluster> {
        if let Some(existing) = self.client.find_by_name::<Cluster>(&description.name).await? {
            self.observer
                .info(&format!("cluster name is {}", description.name));
            self.observer.info(&format!("cluster id is {}", existing.id));
            return Ok(existing);
        }

        self.observer
            .info(&format!("Creating new cluster {}", description.name));
        let args = cluster::Args::new(
            description.name.as_str(),
            description.release.clone(),
            description.deployment_mode.as_str(),
            description.net_provider.as_str(),
        );
        let cluster = self.client.create(&args).await?;

        let mut attributes = Cluster::attributes(&self.client, &cluster.id).await?;
        apply_settings(&mut attributes, description)?;
        Cluster::update_attributes(&self.client, &cluster.id, &attributes).await?;
        Ok(cluster)
    }

    /// Mark `node` for addition to `cluster` with `roles`, and remember it in
    /// `cluster.nodes`. This doesn't wait for anything beyond the HTTP
    /// request itself.
    pub async fn add_node<I, S>(&self, cluster: &mut Cluster, node: &Node, roles: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let update = NodeUpdate {
            pending_roles: Some(roles.into_iter().map(Into::into).collect()),
            pending_addition: Some(true),
            cluster: Some(Some(cluster.id.clone())),
            ..NodeUpdate::default()
        };
        let partial = Partial::<Node>::new(node.id.clone(), update);
        self.observer
            .debug(&format!("Adding node {} to cluster...", node.id));
        Cluster::ADD_NODES
            .invoke(&self.client, &(), CallArgs::new().entire(&[partial])?)
            .await?;
        cluster.nodes.push(node.clone());
        Ok(())
    }

    /// Wait until `cluster` reports itself operational.
    pub async fn wait_operational(&self, cluster: &Cluster, timeout: Duration) -> Result<()> {
        let client = &self.client;
        let observer = &self.observer;
        poll("deploy cluster", timeout, || async move {
            let current = cluster.get_status(client).await?;
            observer.debug(&format!(
                "cluster {} status: {:?}",
                cluster.id, current.status
            ));
            Ok(current.is_operational())
        })
        .await
    }

    /// Wait until every task of `cluster` is ready, failing immediately if
    /// any task reports an error.
    pub async fn wait_tasks_finished(&self, cluster: &Cluster, timeout: Duration) -> Result<()> {
        let client = &self.client;
        poll("wait deployment finished", timeout, || async move {
            let tasks = cluster.get_tasks_status(client).await?;
            all_tasks_finished_ok(&tasks)
        })
        .await
    }

    /// Deploy all pending changes to `cluster` and wait for the deployment to
    /// finish. Each waiting phase gets the full `timeout`. Nothing is rolled
    /// back on failure.
    pub async fn deploy(&self, cluster: &Cluster, timeout: Duration) -> Result<()> {
        self.observer.debug("Starting deploy...");
        cluster.start_deploy(&self.client).await?;
        self.wait_operational(cluster, timeout).await?;
        self.wait_tasks_finished(cluster, timeout).await?;
        self.observer
            .debug(&format!("cluster {} deployed", cluster.id));
        Ok(())
    }
}

#[cfg(test)]
fn tasks(statuses: &[&str]) -> Vec<Task> {
    statuses
        .iter()
        .map(|s| serde_json::from_value(serde_json::json!({ "status": s })).unwrap())
        .collect()
}

#[test]
fn all_ready_tasks_are_finished() {
    assert!(all_tasks_finished_ok(&tasks(&["ready", "ready"])).unwrap());
    assert!(all_tasks_finished_ok(&[]).unwrap());
}

#[test]
fn one_pending_task_means_keep_waiting() {
    assert!(!all_tasks_finished_ok(&tasks(&["ready", "running"])).unwrap());
    assert!(!all_tasks_finished_ok(&tasks(&["running", "ready"])).unwrap());
}

#[test]
fn any_error_task_fails_even_after_pending_ones() {
    let err = all_tasks_finished_ok(&tasks(&["running", "ready", "error"])).unwrap_err();
    assert!(matches!(err, Error::TaskFailed { .. }));
}

#[test]
fn settings_are_copied_into_their_sections() {
    let mut attributes = serde_json::json!({
        "editable": {
            "common": { "debug": { "value": false } },
            "storage": { "volumes_ceph": { "value": false, "label": "Ceph" } },
            "access": { "user": { "value": "admin" } }
        }
    });
    let description = ClusterDescription::new("env", serde_json::json!(1), "multinode", "nova_network")
        .setting("volumes_ceph", true)
        .setting("user", "tester")
        .setting("net_segment_type", "vlan");
    apply_settings(&mut attributes, &description).unwrap();
    assert_eq!(
        attributes,
        serde_json::json!({
            "editable": {
                "common": { "debug": { "value": true } },
                "storage": { "volumes_ceph": { "value": true, "label": "Ceph" } },
                "access": { "user": { "value": "tester" } }
            }
        })
    );
}

#[test]
fn missing_sections_are_reported() {
    let mut attributes = serde_json::json!({ "editable": { "common": {} } });
    let description = ClusterDescription::new("env", serde_json::json!(1), "multinode", "nova_network");
    let err = apply_settings(&mut attributes, &description).unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse { .. }));
}

#[test]
fn descriptions_deserialize_with_defaults() {
    let description: ClusterDescription = serde_json::from_value(serde_json::json!({
        "name": "ha_flat",
        "release": 2,
        "deployment_mode": "ha_compact",
        "net_provider": "nova_network"
    }))
    .unwrap();
    assert!(description.debug);
    assert!(description.settings.is_empty());
    assert_eq!(settings_section("sahara"), Some("additional_components"));
    assert_eq!(settings_section("vc_user"), Some("vcenter"));
    assert_eq!(settings_section("net_provider"), None);
}

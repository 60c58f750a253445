//! A client for the Fuel REST API, plus tools to drive cluster deployments to
//! completion.
//!
//! Fuel deploys OpenStack environments ("clusters") onto bare-metal nodes.
//! Most interesting operations are asynchronous on the server side: we ask
//! for something to happen, then poll until it has.
//!
//! ```no_run
//! use fuel_rest::{Client, ClusterDescription, Orchestrator};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # async fn example() -> fuel_rest::Result<()> {
//! // Talk to the server named by `FUEL_URL`.
//! let client = Client::from_env()?;
//! let orchestrator = Orchestrator::new(client.clone());
//!
//! // Find or create a cluster.
//! let description =
//!     ClusterDescription::new("ha_flat", json!(1), "ha_compact", "nova_network");
//! let mut cluster = orchestrator.create_empty_cluster(&description).await?;
//!
//! // Add every unassigned node as a compute node, and deploy.
//! for node in client.list_all::<fuel_rest::resource::Node>().await? {
//!     if node.cluster.is_none() {
//!         orchestrator.add_node(&mut cluster, &node, vec!["compute"]).await?;
//!     }
//! }
//! orchestrator.deploy(&cluster, Duration::from_secs(60 * 60)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Individual endpoints are declared as [`call::Call`] values, which fill
//! `{placeholders}` in their URL templates from resource attributes. Waiting
//! is handled by [`wait::poll`] and [`wait::wait`].

#![warn(missing_docs)]

#[macro_use]
extern crate fuel_rest_derive;

pub use crate::client::Client;
pub use crate::config::ClientConfig;
pub use crate::deploy::{ClusterDescription, Orchestrator};
pub use crate::errors::*;
pub use crate::observer::{Observer, TracingObserver};
pub use crate::transport::{HttpTransport, Method, Transport};

#[macro_use]
pub mod wait;
pub mod call;
mod client;
mod collection;
pub mod config;
pub mod deploy;
mod errors;
mod observer;
pub mod resource;
pub mod transport;

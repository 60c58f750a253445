//! Create (or reuse) a cluster, assign nodes to it and deploy it.
//!
//! ```text
//! FUEL_URL=http://10.20.0.2:8000 cargo run --example deploy_cluster -- \
//!     ha_flat 2 1=controller 2=compute,cinder
//! ```

use anyhow::{Context, Error};
use fuel_rest::resource::{Id, Node};
use fuel_rest::{Client, ClusterDescription, Orchestrator};
use serde_json::json;
use std::{
    env,
    io::{self, Write},
    process, result,
    time::Duration,
};
use tracing_subscriber::{
    fmt::{format::FmtSpan, Subscriber},
    prelude::*,
    EnvFilter,
};

/// A custom `Result`, for convenience.
pub type Result<T, E = Error> = result::Result<T, E>;

/// How long to wait for each phase of the deployment.
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(90 * 60);

/// A local helper function which does the real work, and which can return
/// an error (unlike `main`).
async fn helper(
    cluster_name: &str,
    release: u64,
    assignments: &[(u64, Vec<String>)],
) -> Result<()> {
    let client = Client::from_env().context("could not configure Fuel client")?;
    let orchestrator = Orchestrator::new(client.clone());

    let description =
        ClusterDescription::new(cluster_name, json!(release), "ha_compact", "nova_network")
            .debug_from_env();
    let mut cluster = orchestrator
        .create_empty_cluster(&description)
        .await
        .context("could not create cluster")?;

    let nodes = client.list_all::<Node>().await?;
    for (node_id, roles) in assignments {
        let id = Id::from(*node_id);
        let node = nodes
            .iter()
            .find(|n| n.id == id)
            .with_context(|| format!("no node with id {}", node_id))?;
        orchestrator
            .add_node(&mut cluster, node, roles.iter().cloned())
            .await?;
    }

    orchestrator
        .deploy(&cluster, DEPLOY_TIMEOUT)
        .await
        .with_context(|| format!("could not deploy cluster {}", cluster.id))?;
    println!("{}", cluster.get_status(&client).await?);
    Ok(())
}

fn usage() -> ! {
    writeln!(
        &mut io::stderr(),
        "\
         Usage: deploy_cluster <CLUSTER_NAME> <RELEASE_ID> <NODE_ID>=<ROLE>[,<ROLE>]..."
    )
    .expect("can't write to stderr, giving up");
    process::exit(1);
}

fn parse_assignment(arg: &str) -> Option<(u64, Vec<String>)> {
    let chunks = arg.splitn(2, '=').collect::<Vec<_>>();
    if chunks.len() != 2 {
        return None;
    }
    let id = chunks[0].parse().ok()?;
    let roles = chunks[1].split(',').map(|r| r.to_owned()).collect();
    Some((id, roles))
}

fn main() {
    // Configure tracing.
    let filter = EnvFilter::from_default_env();
    Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_env_filter(filter)
        .finish()
        .init();

    // Parse our command line options.
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 3 {
        usage();
    }
    let release = args[1].parse::<u64>().unwrap_or_else(|_| usage());
    let assignments = args[2..]
        .iter()
        .map(|arg| parse_assignment(arg).unwrap_or_else(|| usage()))
        .collect::<Vec<_>>();

    // Everything runs on this thread, one request at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("could not build tokio runtime");

    // Dispatch to our helper function and report any errors it returns.
    if let Err(err) = runtime.block_on(helper(&args[0], release, &assignments)) {
        eprint!("ERROR");
        for e in err.chain() {
            eprint!(": {}", e);
        }
        eprintln!();
        process::exit(1);
    }
}

//! Listing and looking up resources.

use crate::call::{Call, CallArgs};
use crate::client::{from_body, Client};
use crate::errors::*;
use crate::resource::{AttributeSource, Cluster, Id, Resource};

impl Client {
    /// Fetch every resource of type `R`. Fuel returns the whole collection in
    /// one response.
    pub async fn list_all<R: Resource>(&self) -> Result<Vec<R>> {
        let call = Call::get(R::collection_path());
        let body = call.invoke(self, &(), CallArgs::new()).await?;
        from_body(call.template(), body, "a list")
    }

    /// Find the first resource of type `R` called `name`, if there is one.
    pub async fn find_by_name<R: Resource>(&self, name: &str) -> Result<Option<R>> {
        let all = self.list_all::<R>().await?;
        Ok(all.into_iter().find(|resource| has_name(resource, name)))
    }

    /// Look up the ID of the cluster called `name`.
    pub async fn get_cluster_id(&self, name: &str) -> Result<Option<Id<Cluster>>> {
        let cluster = self.find_by_name::<Cluster>(name).await?;
        Ok(cluster.map(|c| c.id))
    }

    /// Build a `Cluster` for `id`, with its local node list loaded from the
    /// server.
    pub async fn reflect_cluster(&self, id: Id<Cluster>) -> Result<Cluster> {
        let mut cluster = Cluster::new(id);
        cluster.nodes = cluster.load_nodes(self).await?;
        Ok(cluster)
    }
}

fn has_name<R: Resource>(resource: &R, name: &str) -> bool {
    resource
        .attribute("name")
        .map_or(false, |value| value.as_str() == Some(name))
}

#[test]
fn has_name_compares_the_name_attribute() {
    let mut cluster = Cluster::new(Id::from(1));
    assert!(!has_name(&cluster, "env"));
    cluster.name = Some("env".to_owned());
    assert!(has_name(&cluster, "env"));
    assert!(!has_name(&cluster, "other"));
}

//! Resource types manipulated by the Fuel API.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub use self::cluster::{Cluster, ClusterStatus};
pub use self::id::*;
pub use self::node::{Node, NodeList};
pub use self::task::{Task, TaskStatus};

/// Attributes which we don't model explicitly, keyed by name.
pub type Attributes = BTreeMap<String, Value>;

/// A shared interface to all Fuel resource types.
pub trait Resource: fmt::Debug + DeserializeOwned + Serialize + Send + Sync + 'static {
    /// The name of the Rust type, used when displaying resources.
    fn type_name() -> &'static str;

    /// The path used to list and create resources of this type.
    fn collection_path() -> &'static str;

    /// The URL template for a single resource of this type.
    fn item_template() -> &'static str;

    /// The ID of this resource.
    fn id(&self) -> &Id<Self>;
}

/// Something we can look up URL placeholder values in.
pub trait AttributeSource {
    /// Look up the attribute `name`. JSON `null` counts as missing.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// Resources expose exactly the attributes that they serialize. Anything
/// marked `#[serde(skip)]`, such as a cluster's local node list, is internal
/// state and invisible here.
impl<R: Resource> AttributeSource for R {
    fn attribute(&self, name: &str) -> Option<Value> {
        serialized_attribute(self, name)
    }
}

/// A partial update exposes its key and whichever fields it sets.
impl<R> AttributeSource for Partial<R>
where
    R: Resource + Updatable,
{
    fn attribute(&self, name: &str) -> Option<Value> {
        serialized_attribute(self, name)
    }
}

/// Calls which aren't bound to any resource resolve placeholders from
/// explicit arguments only.
impl AttributeSource for () {
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// A plain attribute map can stand in for a resource.
impl AttributeSource for Attributes {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).filter(|v| !v.is_null()).cloned()
    }
}

/// Serialize `value` and look up the top-level field `name`.
fn serialized_attribute<T: Serialize + ?Sized>(value: &T, name: &str) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => map.remove(name).filter(|v| !v.is_null()),
        _ => None,
    }
}

/// Are `a` and `b` the same server-side resource? Application logic should
/// compare resources this way rather than field-by-field.
pub fn same_resource<R: Resource>(a: &R, b: &R) -> bool {
    a.id() == b.id()
}

/// Write a resource as `Type(name):` followed by its `id` and then every other
/// attribute in name order, one per line.
pub(crate) fn describe<R: Resource>(resource: &R, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut attrs = match serde_json::to_value(resource) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let name = match attrs.remove("name") {
        Some(Value::String(name)) => name,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    write!(f, "{}({}):", R::type_name(), name)?;
    write!(f, "\n    id={}", resource.id().to_value())?;
    attrs.remove("id");
    let sorted: BTreeMap<_, _> = attrs.into_iter().collect();
    for (k, v) in sorted {
        write!(f, "\n    {}={}", k, v)?;
    }
    Ok(())
}

/// Arguments which can be used to create a resource.
pub trait Args: fmt::Debug + Serialize + Send + Sync {
    /// The resource that these arguments will create.
    type Resource: Resource;
}

/// A type which can be partially updated. `#[derive(Updatable)]` generates an
/// `Update` type with an optional value per updatable field.
pub trait Updatable {
    /// The type used to update values of this type.
    type Update: fmt::Debug + Serialize + Send + Sync;
}

macro_rules! updatable_as_self {
    ($($ty:ty),*) => {
        $(
            impl Updatable for $ty {
                type Update = Self;
            }
        )*
    };
}

updatable_as_self!(bool, u64, String, Value);

impl<T: Updatable> Updatable for Option<T> {
    type Update = Option<T::Update>;
}

impl<T> Updatable for Vec<T>
where
    T: fmt::Debug + Serialize + Send + Sync,
{
    type Update = Self;
}

impl<R: Resource> Updatable for Id<R> {
    type Update = Self;
}

/// A partial update: the key of the resource to update, plus only the fields
/// that should change. Serializes as one flat JSON object.
#[derive(Debug, Serialize)]
pub struct Partial<R>
where
    R: Resource + Updatable,
{
    /// The resource to update.
    pub id: Id<R>,

    /// The fields to change.
    #[serde(flatten)]
    pub update: <R as Updatable>::Update,
}

impl<R> Partial<R>
where
    R: Resource + Updatable,
{
    /// Apply `update` to the resource identified by `id`.
    pub fn new(id: Id<R>, update: <R as Updatable>::Update) -> Self {
        Partial { id, update }
    }
}

// Support modules defining general types.
mod id;

// Individual resource types.
pub mod cluster;
pub mod node;
pub mod task;

#[test]
fn same_resource_compares_ids_only() {
    let mut a = Node::new(Id::from(2));
    a.name = "slave-02".to_owned();
    let mut b = Node::new(Id::from(2));
    b.pending_addition = true;
    assert!(same_resource(&a, &b));
    assert!(!same_resource(&a, &Node::new(Id::from(3))));
}

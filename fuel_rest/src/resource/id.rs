//! Resource identifiers used by the Fuel API.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use super::Resource;

/// The raw value of an ID. Fuel uses integers, but we treat IDs as opaque
/// and send back exactly what we were given.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

/// A strongly-typed "resource ID" used to identify many different kinds of
/// Fuel resources.
pub struct Id<R: Resource> {
    /// The ID of the resource.
    id: RawId,
    /// A special 0-byte field which exists just to mention the type `R`
    /// inside the struct, and thus avoid compiler errors about unused type
    /// parameters.
    _phantom: PhantomData<R>,
}

impl<R: Resource> Id<R> {
    fn from_raw(id: RawId) -> Self {
        Id {
            id,
            _phantom: PhantomData,
        }
    }

    /// The ID as a JSON value, suitable for request bodies and placeholders.
    pub fn to_value(&self) -> Value {
        match &self.id {
            RawId::Number(n) => Value::from(*n),
            RawId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl<R: Resource> From<u64> for Id<R> {
    fn from(id: u64) -> Self {
        Id::from_raw(RawId::Number(id))
    }
}

impl<R: Resource> From<&str> for Id<R> {
    fn from(id: &str) -> Self {
        Id::from_raw(RawId::Text(id.to_owned()))
    }
}

// We implement these by hand, because `#[derive]` would require `R` itself
// to be `Clone`, `PartialEq` and so on.

impl<R: Resource> Clone for Id<R> {
    fn clone(&self) -> Self {
        Id::from_raw(self.id.clone())
    }
}

impl<R: Resource> PartialEq for Id<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<R: Resource> Eq for Id<R> {}

impl<R: Resource> PartialOrd for Id<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Resource> Ord for Id<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<R: Resource> Hash for Id<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<R: Resource> fmt::Debug for Id<R> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self)
    }
}

impl<R: Resource> fmt::Display for Id<R> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            RawId::Number(n) => write!(fmt, "{}", n),
            RawId::Text(s) => write!(fmt, "{}", s),
        }
    }
}

impl<'de, R: Resource> Deserialize<'de> for Id<R> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer).map(Id::from_raw)
    }
}

impl<R: Resource> Serialize for Id<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.id.serialize(serializer)
    }
}

#[test]
fn ids_round_trip_unchanged() {
    use super::Node;

    let numeric: Id<Node> = serde_json::from_str("7").unwrap();
    assert_eq!(serde_json::to_string(&numeric).unwrap(), "7");
    assert_eq!(numeric, Id::from(7));
    assert_eq!(numeric.to_string(), "7");

    let text: Id<Node> = serde_json::from_str(r#""node-7""#).unwrap();
    assert_eq!(serde_json::to_string(&text).unwrap(), r#""node-7""#);
    assert_ne!(text, numeric);
}

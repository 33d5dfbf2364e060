//! Transit API response DTOs.
//!
//! These map the JSON:API document shape. Attributes differ per entity
//! type, so they are kept as a loose JSON object and read by name; missing
//! or null attributes are common and not an error.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// A JSON:API response document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    /// Primary records (routes or schedules, depending on the request).
    #[serde(default)]
    pub data: Vec<Resource>,

    /// Related entities requested with `include=`.
    #[serde(default)]
    pub included: Vec<Resource>,
}

/// A single entity: a route, stop, trip, prediction or schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub id: String,

    /// Entity type tag, e.g. `route` or `prediction`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
}

impl Resource {
    /// Read a string attribute. Null, absent and non-string values are `None`.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Id of a to-one related entity, if the relationship is present and set.
    pub fn related_id(&self, relationship: &str) -> Option<&str> {
        match self.relationships.get(relationship)?.data.as_ref()? {
            Linkage::One(identifier) => Some(identifier.id.as_str()),
            Linkage::Many(_) => None,
        }
    }

    /// The entity kind, if it is one the board understands.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        EntityKind::parse(&self.kind)
    }
}

/// A relationship entry. `data` is null when the relation is unset
/// (e.g. a schedule with no live prediction).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// Resource linkage: one identifier for to-one relations, a list for
/// to-many.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// Reference to another entity by type and id.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,
}

/// Included entity types the reconciler resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Route,
    Stop,
    Trip,
    Prediction,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Route,
        EntityKind::Stop,
        EntityKind::Trip,
        EntityKind::Prediction,
    ];

    /// The JSON:API type tag, which is also the relationship name.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Route => "route",
            EntityKind::Stop => "stop",
            EntityKind::Trip => "trip",
            EntityKind::Prediction => "prediction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// crates/domain/src/content.rs

use crate::field::Field;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

/// A field map as authored in the content store.
///
/// Keys are folded to lower case when the map is built, so every lookup is
/// case-insensitive: `linkObject`, `linkobject` and `LINKOBJECT` name the same
/// field. Only the top level is folded; nested values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Content(Map<String, Json>);

impl Content {
    pub fn new(map: Map<String, Json>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        )
    }

    /// Build from any JSON value; non-objects yield an empty map.
    pub fn from_json(value: Json) -> Self {
        match value {
            Json::Object(map) => Self::new(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(&key.to_lowercase())
    }

    /// Accessor wrapper with the coercion helpers.
    pub fn field(&self, key: &str) -> Field<'_> {
        Field::new(self.get(key))
    }

    pub fn insert(&mut self, key: &str, value: Json) {
        self.0.insert(key.to_lowercase(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; keys present in `other` win.
    pub fn merged(&self, other: &Content) -> Content {
        let mut out = self.0.clone();
        for (k, v) in &other.0 {
            out.insert(k.clone(), v.clone());
        }
        Content(out)
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Json> {
        self.0
    }
}

impl From<Map<String, Json>> for Content {
    fn from(map: Map<String, Json>) -> Self {
        Self::new(map)
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Self::from_json(Json::deserialize(d)?))
    }
}

//! Messages exchanged between contexts on the broadcast channel.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{Product, Project};

/// Identity of a cached entity: its numeric id compared as a string, so
/// `7` and `"7"` from loosely typed senders address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for EntityKey {
    fn from(id: u64) -> Self {
        EntityKey(id.to_string())
    }
}

impl From<&str> for EntityKey {
    fn from(id: &str) -> Self {
        EntityKey(id.trim().to_string())
    }
}

impl From<String> for EntityKey {
    fn from(id: String) -> Self {
        EntityKey::from(id.as_str())
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(id) => serializer.serialize_u64(id),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(id) => EntityKey::from(id),
            Repr::Text(id) => EntityKey::from(id),
        })
    }
}

/// A tagged message, `{ "type": TAG, "payload"?: entity, "numericId"?: id }`.
///
/// Tags this build does not know decode as `Unknown` and are ignored by
/// receivers, so newer senders can add message kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheMessage {
    RefreshAll,
    ProductUpsert {
        payload: Product,
    },
    ProjectUpsert {
        payload: Project,
    },
    ProductRemove {
        #[serde(rename = "numericId")]
        numeric_id: EntityKey,
    },
    ProjectRemove {
        #[serde(rename = "numericId")]
        numeric_id: EntityKey,
    },
    #[serde(other)]
    Unknown,
}

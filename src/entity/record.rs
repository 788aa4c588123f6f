// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity record as reported by the hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A device-backed entity known to the hub.
///
/// Entities are the hub's uniform view over plugin-specific state: a light,
/// a switch, a sensor reading. The hub reports them inside entity events and
/// from the `entities` plugin; this struct keeps the fields the client needs
/// to key, group and render them. Plugin-specific attributes stay in
/// [`data`](Self::data) untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique entity id. The hub sends either a string or a numeric id
    /// depending on the endpoint; both forms normalize to a string here.
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,

    /// Human-readable entity name.
    #[serde(default)]
    pub name: String,

    /// Entity type, e.g. `light` or `switch`.
    #[serde(rename = "type", default)]
    pub entity_type: String,

    /// Name of the plugin that owns this entity.
    #[serde(default)]
    pub plugin: Option<String>,

    /// Plugin-specific attributes.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// When the hub last updated this entity.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity {
    /// Creates an entity with the given identity and type.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            plugin: None,
            data: Map::new(),
            updated_at: None,
        }
    }

    /// Returns the name, falling back to the id for unnamed entities.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "entity id must be a string or a number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_id() {
        let json = r#"{"id": 42, "name": "Living Room Light", "type": "light"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id, "42");
        assert_eq!(entity.name, "Living Room Light");
        assert_eq!(entity.entity_type, "light");
    }

    #[test]
    fn deserializes_string_id() {
        let json = r#"{"id": "light:1", "name": "Desk", "type": "light"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id, "light:1");
    }

    #[test]
    fn rejects_non_scalar_id() {
        let json = r#"{"id": [1], "name": "Bad", "type": "light"}"#;
        assert!(serde_json::from_str::<Entity>(json).is_err());
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{"id": 7}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.name, "");
        assert_eq!(entity.entity_type, "");
        assert!(entity.plugin.is_none());
        assert!(entity.data.is_empty());
        assert!(entity.updated_at.is_none());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let named = Entity::new("1", "Kitchen", "light");
        assert_eq!(named.display_name(), "Kitchen");

        let unnamed = Entity::new("sensor:9", "", "sensor");
        assert_eq!(unnamed.display_name(), "sensor:9");
    }

    #[test]
    fn preserves_plugin_data() {
        let json = r#"{
            "id": 3,
            "name": "Hue Lamp",
            "type": "light",
            "plugin": "light.hue",
            "data": {"brightness": 180, "on": true}
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.plugin.as_deref(), Some("light.hue"));
        assert_eq!(entity.data["brightness"], 180);
        assert_eq!(entity.data["on"], true);
    }
}

//! Table (index) definitions
//!
//! A definition carries index settings and the field mappings sent with
//! `create_table`/`update_table`. Properties are kept as raw JSON so callers
//! can pass any engine mapping parameter through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::field_type::FieldType;
use crate::config::TableSettings;
use crate::error::{DocQueryError, Result};

/// Mapping for one field: its type plus any extra parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl FieldMapping {
    /// Create a new field mapping with the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            params: Map::new(),
        }
    }

    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    pub fn keyword() -> Self {
        Self::new(FieldType::Keyword)
    }

    pub fn long() -> Self {
        Self::new(FieldType::Long)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    pub fn double() -> Self {
        Self::new(FieldType::Double)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn date() -> Self {
        Self::new(FieldType::Date)
    }

    /// Set the analyzer (text fields)
    pub fn with_analyzer(self, analyzer: impl Into<String>) -> Self {
        self.with_param("analyzer", analyzer.into())
    }

    /// Set any other mapping parameter (`fielddata`, `format`, ...)
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Wire form: `{"type": ..., <params>}`
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert(
            "type".to_string(),
            Value::String(self.field_type.name().to_string()),
        );
        map.extend(self.params);
        Value::Object(map)
    }
}

/// Settings plus field mappings for one table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableDefinition {
    pub settings: TableSettings,
    pub properties: Map<String, Value>,
}

impl TableDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw properties (`{"age": {"type": "integer"}, ...}`)
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            settings: TableSettings::default(),
            properties,
        }
    }

    /// Add a typed field mapping
    pub fn field(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.properties.insert(name.into(), mapping.into_value());
        self
    }

    /// Add a raw field mapping
    pub fn raw_field(mut self, name: impl Into<String>, mapping: Value) -> Self {
        self.properties.insert(name.into(), mapping);
        self
    }

    pub fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Presence check shared by create and update
    pub fn validate(&self) -> Result<()> {
        if self.properties.is_empty() {
            return Err(DocQueryError::invalid_input("Columns cannot be empty"));
        }
        if self.properties.keys().any(|k| k.is_empty()) {
            return Err(DocQueryError::invalid_input("Field name cannot be empty"));
        }
        Ok(())
    }

    /// Body of an index-creation request
    pub fn create_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.settings.number_of_shards,
                "number_of_replicas": self.settings.number_of_replicas,
            },
            "mappings": {
                "_source": { "enabled": self.settings.source_enabled },
                "properties": self.properties,
            }
        })
    }

    /// Body of a mapping-update request
    pub fn mapping_body(&self) -> Value {
        json!({ "properties": self.properties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping_creation() {
        let mapping = FieldMapping::text()
            .with_analyzer("standard")
            .with_param("fielddata", true);
        assert_eq!(
            mapping.into_value(),
            json!({"type": "text", "analyzer": "standard", "fielddata": true})
        );
    }

    #[test]
    fn test_create_body() {
        let definition = TableDefinition::new()
            .field("title", FieldMapping::text())
            .field("age", FieldMapping::integer())
            .raw_field("score", json!({"type": "rank_feature", "positive_score_impact": false}));

        assert_eq!(definition.field_names(), vec!["title", "age", "score"]);
        assert_eq!(
            definition.create_body(),
            json!({
                "settings": {"number_of_shards": 3, "number_of_replicas": 2},
                "mappings": {
                    "_source": {"enabled": true},
                    "properties": {
                        "title": {"type": "text"},
                        "age": {"type": "integer"},
                        "score": {"type": "rank_feature", "positive_score_impact": false}
                    }
                }
            })
        );
    }

    #[test]
    fn test_mapping_body_and_settings() {
        let definition = TableDefinition::new()
            .field("tag", FieldMapping::keyword())
            .with_settings(TableSettings::default().with_shards(1).with_replicas(0));
        assert_eq!(
            definition.mapping_body(),
            json!({"properties": {"tag": {"type": "keyword"}}})
        );
        assert_eq!(definition.create_body()["settings"]["number_of_shards"], json!(1));
    }

    #[test]
    fn test_empty_definition_rejected() {
        assert!(TableDefinition::new().validate().is_err());
        assert!(TableDefinition::new()
            .field("", FieldMapping::long())
            .validate()
            .is_err());
    }

    #[test]
    fn test_field_mapping_deserialize() {
        let mapping: FieldMapping =
            serde_json::from_value(json!({"type": "date", "format": "yyyy-MM-dd"})).unwrap();
        assert_eq!(mapping.field_type, FieldType::Date);
        assert_eq!(mapping.params.get("format"), Some(&json!("yyyy-MM-dd")));
    }
}

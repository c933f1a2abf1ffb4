//! Field type definitions
//!
//! The engine's core mapping types. Anything not listed here can still be
//! mapped through [`FieldType::Other`].

use serde::{Deserialize, Serialize};

/// Field data type as named in a mapping's `type` key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Analyzed full-text field
    Text,
    /// Exact-match keyword
    Keyword,
    Long,
    Integer,
    Double,
    Float,
    Boolean,
    Date,
    Object,
    Nested,
    /// Any other engine type (`rank_feature`, `geo_point`, ...)
    #[serde(untagged)]
    Other(String),
}

impl FieldType {
    /// Type name used on the wire
    pub fn name(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Keyword => "keyword",
            FieldType::Long => "long",
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Nested => "nested",
            FieldType::Other(name) => name,
        }
    }
}

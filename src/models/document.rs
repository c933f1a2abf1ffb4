use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocQueryError, Result};

/// Engine document identifier
pub type DocumentId = String;

/// Reserved key carrying an explicit document identifier
pub const ID_FIELD: &str = "id";

/// One record: field name to JSON value, in insertion order
///
/// A reserved `id` key, when present, is not stored as a field; it is
/// extracted and used as the engine document identifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a field, replacing any previous value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Split off the reserved `id` key
    ///
    /// String ids are used as-is and integer ids are rendered in decimal.
    /// A null id counts as absent and is dropped from the body. An empty
    /// string id or an id of any other JSON type is rejected.
    pub fn split_id(mut self) -> Result<(Option<DocumentId>, Document)> {
        let id = match self.0.shift_remove(ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => {
                return Err(DocQueryError::invalid_input("Document id cannot be empty"))
            }
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            Some(other) => {
                return Err(DocQueryError::invalid_input(format!(
                    "Document id must be a string or integer, got {}",
                    other
                )))
            }
        };
        Ok((id, self))
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocQueryError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DocQueryError::invalid_input(format!(
                "Document must be a JSON object, got {}",
                other
            ))),
        }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::try_from(value).unwrap()
    }

    #[test]
    fn test_split_string_id() {
        let (id, body) = doc(json!({"id": "x", "a": 1})).split_id().unwrap();
        assert_eq!(id.as_deref(), Some("x"));
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_split_integer_id() {
        let (id, body) = doc(json!({"id": 42, "name": "alice"})).split_id().unwrap();
        assert_eq!(id.as_deref(), Some("42"));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_split_without_id() {
        let (id, body) = doc(json!({"a": 1})).split_id().unwrap();
        assert!(id.is_none());
        assert_eq!(body.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert!(doc(json!({"id": "", "a": 1})).split_id().is_err());
        assert!(doc(json!({"id": 1.5, "a": 1})).split_id().is_err());
        assert!(doc(json!({"id": true, "a": 1})).split_id().is_err());
    }

    #[test]
    fn test_null_id_is_absent() {
        let (id, body) = doc(json!({"id": null, "a": 1})).split_id().unwrap();
        assert!(id.is_none());
        assert_eq!(body.fields(), doc(json!({"a": 1})).fields());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Document::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_field_order_preserved() {
        let d = Document::new().with("z", 1).with("a", 2).with("m", 3);
        let keys: Vec<&String> = d.fields().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}

//! Typed engine responses
//!
//! Only the fields the client relies on are typed; anything else the engine
//! returns is ignored on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::DocumentId;

/// Acknowledgement returned by index administration calls
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledged {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: Option<bool>,
    #[serde(default)]
    pub index: Option<String>,
}

/// Result of a single-document write (index, update, delete)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    /// `created`, `updated`, `deleted`, `noop` or `not_found`
    pub result: String,
}

/// Result of a get-by-id call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    pub found: bool,
    #[serde(rename = "_source", default)]
    pub source: Option<Map<String, Value>>,
}

/// Outcome of one action inside a bulk request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<DocumentId>,
    pub status: u16,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl BulkItemResult {
    /// Read the outcome out of a `{"<action>": {...}}` item
    fn from_item(item: &Map<String, Value>) -> Self {
        item.values()
            .next()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| BulkItemResult {
                index: None,
                id: None,
                status: 0,
                result: None,
                error: Some(Value::Object(item.clone())),
            })
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.status >= 300
    }
}

/// Result of a bulk request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    #[serde(default)]
    pub took: u64,
    pub errors: bool,
    /// One map per action keyed by the action name (`index`)
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
}

impl BulkResult {
    /// Per-item outcomes, one per request item and in request order
    ///
    /// An item whose shape cannot be read is kept in place as a failure
    /// (status 0, raw item as the error) so positions stay aligned with
    /// the submitted documents.
    pub fn item_results(&self) -> Vec<BulkItemResult> {
        self.items.iter().map(BulkItemResult::from_item).collect()
    }

    /// Items the engine rejected, with their position in the batch
    pub fn failed_items(&self) -> Vec<(usize, BulkItemResult)> {
        self.item_results()
            .into_iter()
            .enumerate()
            .filter(|(_, item)| item.is_error())
            .collect()
    }
}

/// Total hit count as reported by the engine
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    #[serde(default)]
    pub relation: Option<String>,
}

/// One search hit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Search response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub hits: Hits,
}

impl SearchResult {
    /// Total matching documents (not just this page)
    pub fn total(&self) -> u64 {
        self.hits
            .total
            .as_ref()
            .map(|t| t.value)
            .unwrap_or(self.hits.hits.len() as u64)
    }

    /// Sources of the returned page, in rank order
    pub fn documents(&self) -> Vec<&Map<String, Value>> {
        self.hits.hits.iter().map(|h| &h.source).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.hits.hits.iter().map(|h| h.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_parsing() {
        let raw = json!({
            "took": 3,
            "timed_out": false,
            "_shards": {"total": 1, "successful": 1},
            "hits": {
                "total": {"value": 12, "relation": "eq"},
                "max_score": 1.2,
                "hits": [
                    {"_index": "users", "_id": "a", "_score": 1.2, "_source": {"name": "alice"}},
                    {"_index": "users", "_id": "b", "_score": 0.7, "_source": {"name": "bob"}}
                ]
            }
        });
        let result: SearchResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.total(), 12);
        assert_eq!(result.ids(), vec!["a", "b"]);
        assert_eq!(result.documents()[1].get("name"), Some(&json!("bob")));
    }

    #[test]
    fn test_bulk_failed_items() {
        let raw = json!({
            "took": 5,
            "errors": true,
            "items": [
                {"index": {"_index": "t", "_id": "1", "status": 201, "result": "created"}},
                {"index": {"_index": "t", "_id": "2", "status": 400,
                           "error": {"type": "mapper_parsing_exception"}}}
            ]
        });
        let result: BulkResult = serde_json::from_value(raw).unwrap();
        let failed = result.failed_items();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 1);
        assert_eq!(failed[0].1.id.as_deref(), Some("2"));
    }

    #[test]
    fn test_unreadable_bulk_item_keeps_positions() {
        let raw = json!({
            "took": 5,
            "errors": true,
            "items": [
                {"index": {"_index": "t", "_id": "1", "status": 201}},
                {"index": {"_index": "t", "_id": "2"}},
                {},
                {"index": {"_index": "t", "_id": "4", "status": 409,
                           "error": {"type": "version_conflict_engine_exception"}}}
            ]
        });
        let result: BulkResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.item_results().len(), 4);

        let positions: Vec<usize> = result.failed_items().iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(result.failed_items()[2].1.id.as_deref(), Some("4"));
    }

    #[test]
    fn test_get_result_not_found_shape() {
        let raw = json!({"_index": "t", "_id": "missing", "found": false});
        let result: GetResult = serde_json::from_value(raw).unwrap();
        assert!(!result.found);
        assert!(result.source.is_none());
    }
}

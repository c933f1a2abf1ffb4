//! Typed wire representation of the engine's query DSL
//!
//! These types only serialize. Their shape is fixed at construction time, so a
//! compiled query cannot be malformed when it reaches the transport.
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [{ "match": { "title": "rust" } }],
//!       "should": [{ "range": { "age": { "gt": 15 } } }],
//!       "filter": [{ "term": { "status": "published" } }]
//!     }
//!   },
//!   "from": 0,
//!   "size": 50
//! }
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::models::{Condition, Predicate, RangeBounds};

/// Single-field clause body: `{ "<field>": <value> }`
#[derive(Clone, Debug, PartialEq)]
pub struct FieldClause<T> {
    pub field: String,
    pub value: T,
}

impl<T: Serialize> Serialize for FieldClause<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

/// Leaf clause inside a bool query
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Match(FieldClause<Value>),
    Term(FieldClause<Value>),
    Terms(FieldClause<Vec<Value>>),
    Range(FieldClause<RangeBounds>),
}

impl Clause {
    pub fn query_type(&self) -> &'static str {
        match self {
            Clause::Match(_) => "match",
            Clause::Term(_) => "term",
            Clause::Terms(_) => "terms",
            Clause::Range(_) => "range",
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Clause::Match(c) | Clause::Term(c) => &c.field,
            Clause::Terms(c) => &c.field,
            Clause::Range(c) => &c.field,
        }
    }
}

impl From<&Condition> for Clause {
    fn from(cond: &Condition) -> Self {
        let field = cond.field.clone();
        match &cond.predicate {
            Predicate::Match(v) => Clause::Match(FieldClause { field, value: v.clone() }),
            Predicate::Term(v) => Clause::Term(FieldClause { field, value: v.clone() }),
            Predicate::Terms(vs) => Clause::Terms(FieldClause { field, value: vs.clone() }),
            Predicate::Range(b) => Clause::Range(FieldClause { field, value: b.clone() }),
        }
    }
}

/// Boolean container
///
/// - `must`: all clauses match (AND), scoring
/// - `should`: OR-joined, scoring; required only through `minimum_should_match`
/// - `filter`: all clauses match, non-scoring
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Clause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Clause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Clause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.filter.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.filter.len()
    }
}

/// `{}` body of a match_all query
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct MatchAll {}

/// Top-level query: either everything or a bool container
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryDsl {
    MatchAll(MatchAll),
    Bool(BoolQuery),
}

impl QueryDsl {
    pub fn query_type(&self) -> &'static str {
        match self {
            QueryDsl::MatchAll(_) => "match_all",
            QueryDsl::Bool(_) => "bool",
        }
    }
}

/// Complete search request body
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SearchBody {
    pub query: QueryDsl,
    pub from: u64,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_all_shape() {
        let body = SearchBody {
            query: QueryDsl::MatchAll(MatchAll {}),
            from: 0,
            size: 50,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"query": {"match_all": {}}, "from": 0, "size": 50})
        );
    }

    #[test]
    fn test_clause_shapes() {
        let clause = Clause::Range(FieldClause {
            field: "age".to_string(),
            value: RangeBounds::default().gt(15),
        });
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"range": {"age": {"gt": 15}}})
        );

        let clause = Clause::Terms(FieldClause {
            field: "tags".to_string(),
            value: vec![json!("a"), json!("b")],
        });
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"terms": {"tags": ["a", "b"]}})
        );
        assert_eq!(clause.query_type(), "terms");
        assert_eq!(clause.field(), "tags");
    }

    #[test]
    fn test_empty_sections_omitted() {
        let query = QueryDsl::Bool(BoolQuery {
            filter: vec![Clause::Term(FieldClause {
                field: "status".to_string(),
                value: json!("active"),
            })],
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"bool": {"filter": [{"term": {"status": "active"}}]}})
        );
    }
}

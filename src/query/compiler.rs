//! Compiles accumulated [`QueryState`] into the engine's bool query
//!
//! Policy for `should` clauses:
//! - with at least one `must` clause, `should` clauses only boost relevance;
//!   `minimum_should_match` is left unset.
//! - with no `must` clause, at least one `should` clause is required
//!   (`minimum_should_match = 1`), including when `filter` clauses exist.
//!
//! An empty state compiles to `match_all` with no bool container.

use tracing::debug;

use super::dsl::{BoolQuery, Clause, MatchAll, QueryDsl, SearchBody};
use super::state::{ConditionSet, QueryState};
use crate::Result;

/// A search ready to send: target table plus request body
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledSearch {
    pub table: String,
    pub body: SearchBody,
}

/// Pure compiler from query state to wire query
pub struct BoolQueryCompiler;

impl BoolQueryCompiler {
    /// Compile a full search request; fails with `InvalidState` when no table is set
    pub fn compile(state: &QueryState) -> Result<CompiledSearch> {
        let table = state.require_table()?.to_string();
        let body = SearchBody {
            query: Self::compile_query(state),
            from: state.pagination.offset(),
            size: state.pagination.limit(),
        };
        debug!(
            table = %table,
            query_type = body.query.query_type(),
            from = body.from,
            size = body.size,
            "compiled search"
        );
        Ok(CompiledSearch { table, body })
    }

    /// Compile only the query part
    pub fn compile_query(state: &QueryState) -> QueryDsl {
        if !state.has_conditions() {
            return QueryDsl::MatchAll(MatchAll {});
        }

        let must = Self::clauses(&state.must);
        let should = Self::clauses(&state.should);
        let filter = Self::clauses(&state.filter);

        let minimum_should_match = if !should.is_empty() && must.is_empty() {
            Some(1)
        } else {
            None
        };

        QueryDsl::Bool(BoolQuery {
            must,
            should,
            filter,
            minimum_should_match,
        })
    }

    fn clauses(set: &ConditionSet) -> Vec<Clause> {
        set.iter().map(Clause::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocQueryError;
    use crate::models::{Condition, Operator, Predicate};
    use serde_json::{json, Value};

    fn state_for(table: &str) -> QueryState {
        let mut state = QueryState::new();
        state.set_table(table).unwrap();
        state
    }

    fn matching(field: &str, value: Value) -> Condition {
        Condition::new(field, Predicate::Match(value)).unwrap()
    }

    fn compiled(state: &QueryState) -> Value {
        serde_json::to_value(BoolQueryCompiler::compile(state).unwrap().body).unwrap()
    }

    #[test]
    fn test_empty_state_is_match_all() {
        let state = state_for("users");
        assert_eq!(
            compiled(&state),
            json!({"query": {"match_all": {}}, "from": 0, "size": 50})
        );
    }

    #[test]
    fn test_requires_table() {
        let state = QueryState::new();
        assert!(matches!(
            BoolQueryCompiler::compile(&state),
            Err(DocQueryError::InvalidState(_))
        ));
    }

    #[test]
    fn test_must_only() {
        let mut state = state_for("users");
        state.must.upsert(matching("name", json!("alice")));
        state.must.upsert(matching("city", json!("paris")));

        assert_eq!(
            compiled(&state)["query"],
            json!({"bool": {"must": [
                {"match": {"name": "alice"}},
                {"match": {"city": "paris"}}
            ]}})
        );
    }

    #[test]
    fn test_should_boosts_when_must_present() {
        let mut state = state_for("users");
        state.must.upsert(matching("title", json!("storm")));
        state
            .should
            .upsert(Condition::compare("age", Operator::Gt, 15).unwrap());

        assert_eq!(
            compiled(&state)["query"],
            json!({"bool": {
                "must": [{"match": {"title": "storm"}}],
                "should": [{"range": {"age": {"gt": 15}}}]
            }})
        );
    }

    #[test]
    fn test_should_required_without_must() {
        let mut state = state_for("users");
        state.should.upsert(matching("age", json!(52)));
        state
            .filter
            .upsert(Condition::new("status", Predicate::Term(json!("active"))).unwrap());

        assert_eq!(
            compiled(&state)["query"],
            json!({"bool": {
                "should": [{"match": {"age": 52}}],
                "filter": [{"term": {"status": "active"}}],
                "minimum_should_match": 1
            }})
        );
    }

    #[test]
    fn test_last_write_wins_per_field() {
        let mut state = state_for("users");
        state.must.upsert(matching("name", json!("alice")));
        state.must.upsert(matching("name", json!("bob")));

        assert_eq!(
            compiled(&state)["query"]["bool"]["must"],
            json!([{"match": {"name": "bob"}}])
        );
    }

    #[test]
    fn test_falsy_values_kept() {
        let mut state = state_for("users");
        state.must.upsert(matching("count", json!(0)));
        state.must.upsert(matching("nick", json!("")));

        assert_eq!(
            compiled(&state)["query"]["bool"]["must"],
            json!([{"match": {"count": 0}}, {"match": {"nick": ""}}])
        );
    }

    #[test]
    fn test_pagination_offsets() {
        let mut state = state_for("users");
        state.set_page(2, 10).unwrap();
        let body = compiled(&state);
        assert_eq!(body["from"], json!(10));
        assert_eq!(body["size"], json!(10));
    }

    #[test]
    fn test_compile_is_pure() {
        let mut state = state_for("users");
        state.filter.upsert(
            Condition::new("tags", Predicate::Terms(vec![json!("a"), json!("b")])).unwrap(),
        );
        let before = state.clone();
        let first = BoolQueryCompiler::compile(&state).unwrap();
        let second = BoolQueryCompiler::compile(&state).unwrap();
        assert_eq!(first, second);
        assert_eq!(state, before);
    }
}

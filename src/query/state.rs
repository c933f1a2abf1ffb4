//! Per-request query state accumulated by the fluent setters
//!
//! Setters validate before touching anything, so a rejected call leaves the
//! state exactly as it was. Terminal operations take the whole state with
//! [`QueryState::take`], which resets it in the same step.

use crate::error::{DocQueryError, Result};
use crate::models::Condition;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Ordered field → condition mapping
///
/// Field names are unique; setting a field again replaces its predicate in
/// place (last write wins, first insertion position kept).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the condition for its field
    pub fn upsert(&mut self, condition: Condition) {
        match self
            .conditions
            .iter_mut()
            .find(|c| c.field == condition.field)
        {
            Some(existing) => existing.predicate = condition.predicate,
            None => self.conditions.push(condition),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Page number (1-based) and page size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> Result<Self> {
        if page == 0 {
            return Err(DocQueryError::invalid_input("page must be positive"));
        }
        if page_size == 0 {
            return Err(DocQueryError::invalid_input("page size must be positive"));
        }
        Ok(Self { page, page_size })
    }

    /// Number of hits to skip
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Mutable per-builder record of the query being composed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryState {
    table: Option<String>,
    pub must: ConditionSet,
    pub should: ConditionSet,
    pub filter: ConditionSet,
    pub pagination: Pagination,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(DocQueryError::invalid_input("Table name cannot be empty"));
        }
        self.table = Some(name);
        Ok(())
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Active table, or `InvalidState` when none was selected
    pub fn require_table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| DocQueryError::invalid_state("no table selected; call table() first"))
    }

    pub fn set_page(&mut self, page: u64, page_size: u64) -> Result<()> {
        self.pagination = Pagination::new(page, page_size)?;
        Ok(())
    }

    pub fn has_conditions(&self) -> bool {
        !(self.must.is_empty() && self.should.is_empty() && self.filter.is_empty())
    }

    /// Move the state out, leaving an empty default behind
    pub fn take(&mut self) -> QueryState {
        std::mem::take(self)
    }

    pub fn is_reset(&self) -> bool {
        *self == QueryState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Predicate;
    use serde_json::json;

    fn cond(field: &str, value: serde_json::Value) -> Condition {
        Condition::new(field, Predicate::Match(value)).unwrap()
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let mut set = ConditionSet::new();
        set.upsert(cond("a", json!(1)));
        set.upsert(cond("b", json!(2)));
        set.upsert(cond("a", json!(3)));

        assert_eq!(set.len(), 2);
        let fields: Vec<&str> = set.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
        assert_eq!(set.get("a").unwrap().predicate, Predicate::Match(json!(3)));
    }

    #[test]
    fn test_pagination() {
        let default = Pagination::default();
        assert_eq!((default.offset(), default.limit()), (0, 50));

        let p = Pagination::new(2, 10).unwrap();
        assert_eq!((p.offset(), p.limit()), (10, 10));

        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
    }

    #[test]
    fn test_rejected_setter_leaves_state_untouched() {
        let mut state = QueryState::new();
        state.set_table("users").unwrap();
        state.set_page(3, 20).unwrap();

        assert!(state.set_table("").is_err());
        assert!(state.set_page(0, 5).is_err());
        assert_eq!(state.table(), Some("users"));
        assert_eq!(state.pagination, Pagination::new(3, 20).unwrap());
    }

    #[test]
    fn test_take_resets() {
        let mut state = QueryState::new();
        state.set_table("users").unwrap();
        state.must.upsert(cond("name", json!("alice")));

        let taken = state.take();
        assert_eq!(taken.table(), Some("users"));
        assert!(taken.has_conditions());
        assert!(state.is_reset());
        assert!(matches!(
            state.require_table(),
            Err(DocQueryError::InvalidState(_))
        ));
    }
}

//! Query state and bool-query compilation
//!
//! The fluent client mutates a [`QueryState`]; [`BoolQueryCompiler`] turns it
//! into a typed [`SearchBody`] in the engine's query DSL.

pub mod compiler;
pub mod dsl;
pub mod state;

pub use compiler::{BoolQueryCompiler, CompiledSearch};
pub use dsl::{BoolQuery, Clause, FieldClause, MatchAll, QueryDsl, SearchBody};
pub use state::{ConditionSet, Pagination, QueryState, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

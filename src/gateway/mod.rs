//! Request gateway: the only component that talks to the engine
//!
//! The client compiles payloads and hands them to a [`RequestGateway`]. The
//! gateway owns transport concerns (connections, auth, timeouts) and maps
//! engine failures into [`DocQueryError`](crate::DocQueryError) variants:
//! a missing document on an id-addressed call is `NotFound`, anything else
//! the engine or network rejects is `Transport`.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Acknowledged, BulkResult, GetResult, SearchResult, WriteResult};
use crate::payload::{BulkPayload, DocumentRef, IndexPayload, UpdatePayload};
use crate::query::CompiledSearch;
use crate::schema::TableDefinition;
use crate::Result;

/// Raw engine primitives consumed by the client
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Create a table with settings and mappings
    async fn create_index(&self, table: &str, definition: &TableDefinition) -> Result<Acknowledged>;

    /// Add or change field mappings of an existing table
    async fn update_mapping(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged>;

    /// Describe mappings of the given tables, or of every table when empty
    async fn get_mapping(&self, tables: &[String]) -> Result<Value>;

    async fn index_document(&self, payload: &IndexPayload) -> Result<WriteResult>;

    async fn bulk(&self, payload: &BulkPayload) -> Result<BulkResult>;

    async fn get(&self, document: &DocumentRef) -> Result<GetResult>;

    async fn update(&self, payload: &UpdatePayload) -> Result<WriteResult>;

    async fn delete(&self, document: &DocumentRef) -> Result<WriteResult>;

    async fn search(&self, search: &CompiledSearch) -> Result<SearchResult>;
}

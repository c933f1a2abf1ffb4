//! Fluent client facade
//!
//! [`Client`] holds one [`QueryState`]. Setters validate and mutate it;
//! terminal operations take it out (leaving a fresh default behind) before
//! doing anything else, so no table or condition survives into the next call
//! whether the operation succeeds or fails.
//!
//! ```rust,ignore
//! let mut client = Client::connect(&ClientConfig::new(["127.0.0.1:9200"]))?;
//! let page = client
//!     .table("articles")?
//!     .where_("title", "storm")?
//!     .where_or_op("views", ">", 100)?
//!     .filter("status", "published")?
//!     .page(2, 20)?
//!     .get()
//!     .await?;
//! ```

use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{DocQueryError, Result};
use crate::gateway::{HttpGateway, RequestGateway};
use crate::metrics::ClientMetrics;
use crate::models::{
    Acknowledged, BulkResult, Condition, Document, GetResult, Operator, Predicate, SearchResult,
    WriteResult,
};
use crate::payload::CrudPayloadBuilder;
use crate::query::{BoolQueryCompiler, CompiledSearch, QueryState};
use crate::schema::TableDefinition;

/// Fluent query builder and CRUD client over a [`RequestGateway`]
///
/// Not meant to be shared between concurrent call chains: every mutating
/// method takes `&mut self`.
pub struct Client<G: RequestGateway> {
    gateway: G,
    state: QueryState,
    metrics: ClientMetrics,
}

impl<G: RequestGateway> std::fmt::Debug for Client<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Client<HttpGateway> {
    /// Client speaking HTTP to the configured hosts
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        Self::new(HttpGateway::new(config)?)
    }
}

impl<G: RequestGateway> Client<G> {
    pub fn new(gateway: G) -> Result<Self> {
        Ok(Self {
            gateway,
            state: QueryState::new(),
            metrics: ClientMetrics::new()?,
        })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Current accumulated state
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Discard the accumulated state without issuing a request
    pub fn reset(&mut self) -> &mut Self {
        self.state = QueryState::new();
        self
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    /// Select the table for subsequent operations
    pub fn table(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.state.set_table(name)?;
        Ok(self)
    }

    /// Add (or replace) a must-match condition; arrays test membership
    pub fn where_(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.where_with(field, Predicate::matching(value.into()))
    }

    pub fn where_with(
        &mut self,
        field: impl Into<String>,
        predicate: Predicate,
    ) -> Result<&mut Self> {
        let condition = Condition::new(field, predicate)?;
        self.state.must.upsert(condition);
        Ok(self)
    }

    /// `(field, operator, value)` must condition, e.g. `("age", ">=", 18)`
    pub fn where_op(
        &mut self,
        field: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let op: Operator = op.parse()?;
        self.state.must.upsert(Condition::compare(field, op, value)?);
        Ok(self)
    }

    /// Add (or replace) an OR-joined condition; arrays test membership
    pub fn where_or(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.where_or_with(field, Predicate::matching(value.into()))
    }

    pub fn where_or_with(
        &mut self,
        field: impl Into<String>,
        predicate: Predicate,
    ) -> Result<&mut Self> {
        let condition = Condition::new(field, predicate)?;
        self.state.should.upsert(condition);
        Ok(self)
    }

    pub fn where_or_op(
        &mut self,
        field: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let op: Operator = op.parse()?;
        self.state.should.upsert(Condition::compare(field, op, value)?);
        Ok(self)
    }

    /// Add (or replace) an exact, non-scoring filter; arrays test membership
    pub fn filter(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.filter_with(field, Predicate::exact(value.into()))
    }

    /// Filter with an explicit predicate; full-text `Match` is rejected
    pub fn filter_with(
        &mut self,
        field: impl Into<String>,
        predicate: Predicate,
    ) -> Result<&mut Self> {
        if !predicate.is_exact() {
            return Err(DocQueryError::invalid_input(
                "filter conditions must be exact (term, terms or range)",
            ));
        }
        let condition = Condition::new(field, predicate)?;
        self.state.filter.upsert(condition);
        Ok(self)
    }

    /// Set 1-based page number and page size (defaults: 1, 50)
    pub fn page(&mut self, page: u64, page_size: u64) -> Result<&mut Self> {
        self.state.set_page(page, page_size)?;
        Ok(self)
    }

    /// Preview the search the current state would send; state is kept
    pub fn compile(&self) -> Result<CompiledSearch> {
        BoolQueryCompiler::compile(&self.state)
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    /// Search the selected table with the accumulated conditions
    pub async fn get(&mut self) -> Result<SearchResult> {
        let state = self.state.take();
        let started = Instant::now();
        let result = match BoolQueryCompiler::compile(&state) {
            Ok(search) => self.gateway.search(&search).await,
            Err(e) => Err(e),
        };
        self.finish("search", started, result)
    }

    /// Index one document; a reserved `id` key becomes the document id
    pub async fn insert(&mut self, document: Document) -> Result<WriteResult> {
        let state = self.state.take();
        let started = Instant::now();
        let payload = state
            .require_table()
            .and_then(|table| CrudPayloadBuilder::insert(table, document));
        let result = match payload {
            Ok(payload) => self.gateway.index_document(&payload).await,
            Err(e) => Err(e),
        };
        self.finish("insert", started, result)
    }

    /// Bulk-index documents in order
    pub async fn insert_all<I>(&mut self, documents: I) -> Result<BulkResult>
    where
        I: IntoIterator<Item = Document>,
    {
        let state = self.state.take();
        let started = Instant::now();
        let payload = state
            .require_table()
            .and_then(|table| CrudPayloadBuilder::insert_all(table, documents));
        let result = match payload {
            Ok(payload) => {
                self.metrics.record_batch(payload.document_count());
                self.gateway.bulk(&payload).await
            }
            Err(e) => Err(e),
        };
        if let Ok(bulk) = &result {
            let failed = bulk.failed_items();
            if !failed.is_empty() {
                warn!(
                    table = state.table().unwrap_or_default(),
                    failed = failed.len(),
                    first_position = failed[0].0,
                    "bulk insert reported item errors"
                );
            }
        }
        self.finish("insert_all", started, result)
    }

    /// Fetch one document by id
    pub async fn find_by_id(&mut self, id: &str) -> Result<GetResult> {
        let state = self.state.take();
        let started = Instant::now();
        let target = state
            .require_table()
            .and_then(|table| CrudPayloadBuilder::find_by_id(table, id));
        let result = match target {
            Ok(target) => self.gateway.get(&target).await,
            Err(e) => Err(e),
        };
        self.finish("find_by_id", started, result)
    }

    /// Merge a partial document into an existing one
    pub async fn update_by_id(&mut self, id: &str, partial: Document) -> Result<WriteResult> {
        let state = self.state.take();
        let started = Instant::now();
        let payload = state
            .require_table()
            .and_then(|table| CrudPayloadBuilder::update_by_id(table, id, partial));
        let result = match payload {
            Ok(payload) => self.gateway.update(&payload).await,
            Err(e) => Err(e),
        };
        self.finish("update_by_id", started, result)
    }

    pub async fn delete_by_id(&mut self, id: &str) -> Result<WriteResult> {
        let state = self.state.take();
        let started = Instant::now();
        let target = state
            .require_table()
            .and_then(|table| CrudPayloadBuilder::delete_by_id(table, id));
        let result = match target {
            Ok(target) => self.gateway.delete(&target).await,
            Err(e) => Err(e),
        };
        self.finish("delete_by_id", started, result)
    }

    // ------------------------------------------------------------------
    // Administration (pass-through, does not touch query state)
    // ------------------------------------------------------------------

    /// Create a table with the default settings and the given columns
    pub async fn create_table(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        let started = Instant::now();
        let result = match Self::check_admin(table, definition) {
            Ok(()) => {
                info!(table, fields = definition.properties.len(), "creating table");
                self.gateway.create_index(table, definition).await
            }
            Err(e) => Err(e),
        };
        self.finish("create_table", started, result)
    }

    /// Add or change column mappings of an existing table
    pub async fn update_table(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        let started = Instant::now();
        let result = match Self::check_admin(table, definition) {
            Ok(()) => {
                info!(table, fields = definition.properties.len(), "updating table mapping");
                self.gateway.update_mapping(table, definition).await
            }
            Err(e) => Err(e),
        };
        self.finish("update_table", started, result)
    }

    /// Describe the given tables, or every table when `tables` is empty
    pub async fn get_table_info(&self, tables: &[String]) -> Result<Value> {
        let started = Instant::now();
        let result = if tables.iter().any(|t| t.is_empty()) {
            Err(DocQueryError::invalid_input("Table name cannot be empty"))
        } else {
            self.gateway.get_mapping(tables).await
        };
        self.finish("get_table_info", started, result)
    }

    fn check_admin(table: &str, definition: &TableDefinition) -> Result<()> {
        if table.is_empty() {
            return Err(DocQueryError::invalid_input("Table name cannot be empty"));
        }
        definition.validate()
    }

    fn finish<T>(&self, op: &'static str, started: Instant, result: Result<T>) -> Result<T> {
        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(_) => {
                debug!(op, elapsed_ms = elapsed * 1000.0, "operation completed");
                self.metrics.record(op, elapsed, None);
            }
            Err(e) => {
                warn!(op, kind = e.kind(), error = %e, "operation failed");
                self.metrics.record(op, elapsed, Some(e.kind()));
            }
        }
        result
    }
}

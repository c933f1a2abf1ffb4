//! In-memory gateway that records every call
//!
//! Documents written through it are kept per table so id-addressed reads,
//! updates and deletes behave like the engine (including `NotFound`).
//! Searches do not evaluate conditions: they page through every stored
//! document of the table in insertion order.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::events::GatewayCall;
use super::history::CallLog;
use crate::error::{DocQueryError, Result};
use crate::gateway::RequestGateway;
use crate::models::{
    Acknowledged, BulkResult, GetResult, Hit, Hits, SearchResult, TotalHits, WriteResult,
};
use crate::payload::{BulkLine, BulkPayload, DocumentRef, IndexPayload, UpdatePayload};
use crate::query::CompiledSearch;
use crate::schema::TableDefinition;

#[derive(Default)]
struct Store {
    tables: BTreeMap<String, Vec<(String, Map<String, Value>)>>,
    next_id: u64,
    failure: Option<(Option<u16>, String)>,
}

impl Store {
    fn put(
        &mut self,
        table: &str,
        id: Option<String>,
        source: Map<String, Value>,
    ) -> (String, bool) {
        let id = id.unwrap_or_else(|| {
            self.next_id += 1;
            format!("auto-{}", self.next_id)
        });
        let docs = self.tables.entry(table.to_string()).or_default();
        match docs.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, body)) => {
                *body = source;
                (id, false)
            }
            None => {
                docs.push((id.clone(), source));
                (id, true)
            }
        }
    }

    fn find_mut(&mut self, doc: &DocumentRef) -> Option<&mut Map<String, Value>> {
        self.tables
            .get_mut(&doc.table)?
            .iter_mut()
            .find(|(id, _)| *id == doc.id)
            .map(|(_, body)| body)
    }
}

/// Recording, scriptable in-memory [`RequestGateway`]
#[derive(Clone, Default)]
pub struct RecordingGateway {
    log: CallLog,
    store: Arc<Mutex<Store>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Make the next call fail with a transport error
    pub fn fail_next(&self, status: Option<u16>, message: impl Into<String>) {
        self.store.lock().failure = Some((status, message.into()));
    }

    /// Number of documents stored for a table
    pub fn document_count(&self, table: &str) -> usize {
        self.store
            .lock()
            .tables
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Record the call, then consume any scripted failure
    fn enter(&self, call: GatewayCall) -> Result<()> {
        self.log.record(call);
        match self.store.lock().failure.take() {
            Some((status, message)) => Err(DocQueryError::Transport { status, message }),
            None => Ok(()),
        }
    }

    fn not_found(doc: &DocumentRef) -> DocQueryError {
        DocQueryError::NotFound {
            table: doc.table.clone(),
            id: doc.id.clone(),
        }
    }
}

#[async_trait]
impl RequestGateway for RecordingGateway {
    async fn create_index(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        self.enter(GatewayCall::CreateIndex {
            table: table.to_string(),
            body: definition.create_body(),
        })?;
        self.store.lock().tables.entry(table.to_string()).or_default();
        Ok(Acknowledged {
            acknowledged: true,
            shards_acknowledged: Some(true),
            index: Some(table.to_string()),
        })
    }

    async fn update_mapping(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        self.enter(GatewayCall::UpdateMapping {
            table: table.to_string(),
            body: definition.mapping_body(),
        })?;
        Ok(Acknowledged {
            acknowledged: true,
            ..Default::default()
        })
    }

    async fn get_mapping(&self, tables: &[String]) -> Result<Value> {
        self.enter(GatewayCall::GetMapping {
            tables: tables.to_vec(),
        })?;
        let store = self.store.lock();
        let described: Map<String, Value> = store
            .tables
            .keys()
            .filter(|name| tables.is_empty() || tables.contains(name))
            .map(|name| (name.clone(), json!({"mappings": {}})))
            .collect();
        Ok(Value::Object(described))
    }

    async fn index_document(&self, payload: &IndexPayload) -> Result<WriteResult> {
        self.enter(GatewayCall::Index(payload.clone()))?;
        let (id, created) = self.store.lock().put(
            &payload.table,
            payload.id.clone(),
            payload.body.clone().into_fields(),
        );
        Ok(WriteResult {
            index: payload.table.clone(),
            id,
            version: Some(1),
            result: if created { "created" } else { "updated" }.to_string(),
        })
    }

    async fn bulk(&self, payload: &BulkPayload) -> Result<BulkResult> {
        self.enter(GatewayCall::Bulk(payload.clone()))?;
        let mut store = self.store.lock();
        let mut items = Vec::new();
        for pair in payload.lines().chunks(2) {
            if let [BulkLine::Action(action), BulkLine::Source(source)] = pair {
                let (id, _) = store.put(
                    &action.index.index,
                    action.index.id.clone(),
                    source.clone().into_fields(),
                );
                let mut item = Map::new();
                item.insert(
                    "index".to_string(),
                    json!({
                        "_index": action.index.index,
                        "_id": id,
                        "status": 201,
                        "result": "created"
                    }),
                );
                items.push(item);
            }
        }
        Ok(BulkResult {
            took: 0,
            errors: false,
            items,
        })
    }

    async fn get(&self, document: &DocumentRef) -> Result<GetResult> {
        self.enter(GatewayCall::Get(document.clone()))?;
        let mut store = self.store.lock();
        let source = store
            .find_mut(document)
            .map(|body| body.clone())
            .ok_or_else(|| Self::not_found(document))?;
        Ok(GetResult {
            index: document.table.clone(),
            id: document.id.clone(),
            version: Some(1),
            found: true,
            source: Some(source),
        })
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<WriteResult> {
        self.enter(GatewayCall::Update(payload.clone()))?;
        let doc = DocumentRef {
            table: payload.table.clone(),
            id: payload.id.clone(),
        };
        let mut store = self.store.lock();
        let body = store.find_mut(&doc).ok_or_else(|| Self::not_found(&doc))?;
        for (field, value) in payload.body.doc.fields() {
            body.insert(field.clone(), value.clone());
        }
        Ok(WriteResult {
            index: doc.table,
            id: doc.id,
            version: Some(2),
            result: "updated".to_string(),
        })
    }

    async fn delete(&self, document: &DocumentRef) -> Result<WriteResult> {
        self.enter(GatewayCall::Delete(document.clone()))?;
        let mut store = self.store.lock();
        let docs = store
            .tables
            .get_mut(&document.table)
            .ok_or_else(|| Self::not_found(document))?;
        let position = docs
            .iter()
            .position(|(id, _)| *id == document.id)
            .ok_or_else(|| Self::not_found(document))?;
        docs.remove(position);
        Ok(WriteResult {
            index: document.table.clone(),
            id: document.id.clone(),
            version: Some(2),
            result: "deleted".to_string(),
        })
    }

    async fn search(&self, search: &CompiledSearch) -> Result<SearchResult> {
        self.enter(GatewayCall::Search(search.clone()))?;
        let store = self.store.lock();
        let docs = store
            .tables
            .get(&search.table)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let hits = docs
            .iter()
            .skip(search.body.from as usize)
            .take(search.body.size as usize)
            .map(|(id, source)| Hit {
                index: search.table.clone(),
                id: id.clone(),
                score: Some(1.0),
                source: source.clone(),
            })
            .collect();
        Ok(SearchResult {
            took: 0,
            timed_out: false,
            hits: Hits {
                total: Some(TotalHits {
                    value: docs.len() as u64,
                    relation: Some("eq".to_string()),
                }),
                max_score: Some(1.0),
                hits,
            },
        })
    }
}

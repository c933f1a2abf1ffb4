//! Gateway call records
//!
//! Every call reaching a [`RecordingGateway`](super::RecordingGateway) is
//! captured as a [`GatewayCall`] carrying the exact payload it received.

use serde_json::Value;
use std::fmt;

use crate::payload::{BulkPayload, DocumentRef, IndexPayload, UpdatePayload};
use crate::query::CompiledSearch;

/// One gateway invocation with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    CreateIndex { table: String, body: Value },
    UpdateMapping { table: String, body: Value },
    GetMapping { tables: Vec<String> },
    Index(IndexPayload),
    Bulk(BulkPayload),
    Get(DocumentRef),
    Update(UpdatePayload),
    Delete(DocumentRef),
    Search(CompiledSearch),
}

impl GatewayCall {
    /// Operation name (for assertions and logging)
    pub fn name(&self) -> &'static str {
        match self {
            GatewayCall::CreateIndex { .. } => "create_index",
            GatewayCall::UpdateMapping { .. } => "update_mapping",
            GatewayCall::GetMapping { .. } => "get_mapping",
            GatewayCall::Index(_) => "index",
            GatewayCall::Bulk(_) => "bulk",
            GatewayCall::Get(_) => "get",
            GatewayCall::Update(_) => "update",
            GatewayCall::Delete(_) => "delete",
            GatewayCall::Search(_) => "search",
        }
    }

    /// Target table, when the call addresses exactly one
    pub fn table(&self) -> Option<&str> {
        match self {
            GatewayCall::CreateIndex { table, .. } | GatewayCall::UpdateMapping { table, .. } => {
                Some(table)
            }
            GatewayCall::Index(p) => Some(&p.table),
            GatewayCall::Get(d) | GatewayCall::Delete(d) => Some(&d.table),
            GatewayCall::Update(p) => Some(&p.table),
            GatewayCall::Search(s) => Some(&s.table),
            GatewayCall::GetMapping { .. } | GatewayCall::Bulk(_) => None,
        }
    }
}

impl fmt::Display for GatewayCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table() {
            Some(table) => write!(f, "{}({})", self.name(), table),
            None => write!(f, "{}", self.name()),
        }
    }
}

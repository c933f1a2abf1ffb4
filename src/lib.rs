pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod payload;
pub mod query;
pub mod schema;
pub mod testing;

pub use client::Client;
pub use config::{ClientConfig, TableSettings};
pub use error::{DocQueryError, Result};
pub use gateway::{HttpGateway, RequestGateway};
pub use metrics::ClientMetrics;
pub use models::*;
pub use payload::{BulkPayload, CrudPayloadBuilder, DocumentRef, IndexPayload, UpdatePayload};
pub use query::{BoolQueryCompiler, CompiledSearch, QueryDsl, QueryState, SearchBody};
pub use schema::{FieldMapping, FieldType, TableDefinition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

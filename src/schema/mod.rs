//! Table definitions for index administration
//!
//! This module defines what `create_table`/`update_table` send:
//! - Field types (text, keyword, numeric, date, ...)
//! - Field mappings (type plus pass-through parameters)
//! - Table settings and the request bodies built from them

mod field_type;
mod mapping;

pub use field_type::FieldType;
pub use mapping::{FieldMapping, TableDefinition};

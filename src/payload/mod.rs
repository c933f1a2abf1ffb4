//! Request payloads for document CRUD
//!
//! [`CrudPayloadBuilder`] validates caller input and produces the typed
//! payload for each write/read-by-id operation. Nothing here touches the
//! network.

use serde::Serialize;
use tracing::debug;

use crate::error::{DocQueryError, Result};
use crate::models::{Document, DocumentId};

/// Index one document, optionally under an explicit id
#[derive(Clone, Debug, PartialEq)]
pub struct IndexPayload {
    pub table: String,
    pub id: Option<DocumentId>,
    pub body: Document,
}

/// Action descriptor line of a bulk request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkAction {
    pub index: BulkTarget,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkTarget {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
}

/// One line of a bulk request body
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BulkLine {
    Action(BulkAction),
    Source(Document),
}

/// Flat, ordered action/source sequence, one pair per document
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BulkPayload {
    lines: Vec<BulkLine>,
}

impl BulkPayload {
    pub fn lines(&self) -> &[BulkLine] {
        &self.lines
    }

    /// Number of documents (half the line count)
    pub fn document_count(&self) -> usize {
        self.lines.len() / 2
    }

    /// Newline-delimited JSON, terminated by a final newline
    pub fn to_ndjson(&self) -> Result<String> {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&serde_json::to_string(line)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Partial-document merge
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateBody {
    pub doc: Document,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePayload {
    pub table: String,
    pub id: DocumentId,
    pub body: UpdateBody,
}

/// Get/delete address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRef {
    pub table: String,
    pub id: DocumentId,
}

pub struct CrudPayloadBuilder;

impl CrudPayloadBuilder {
    /// Index request for one document
    ///
    /// A reserved `id` key becomes the explicit identifier and is removed from
    /// the body. The document must be non-empty both before and after that.
    pub fn insert(table: &str, document: Document) -> Result<IndexPayload> {
        let table = Self::check_table(table)?;
        if document.is_empty() {
            return Err(DocQueryError::invalid_input("Data cannot be empty"));
        }
        let (id, body) = document.split_id()?;
        if body.is_empty() {
            return Err(DocQueryError::invalid_input(
                "Data cannot be empty once the id is removed",
            ));
        }
        debug!(table = %table, id = ?id, fields = body.len(), "built index payload");
        Ok(IndexPayload { table, id, body })
    }

    /// Bulk index request, preserving input order
    pub fn insert_all<I>(table: &str, documents: I) -> Result<BulkPayload>
    where
        I: IntoIterator<Item = Document>,
    {
        let table = Self::check_table(table)?;
        let mut lines = Vec::new();
        for (position, document) in documents.into_iter().enumerate() {
            let (id, body) = document.split_id()?;
            if body.is_empty() {
                return Err(DocQueryError::invalid_input(format!(
                    "Document at position {} is empty",
                    position
                )));
            }
            lines.push(BulkLine::Action(BulkAction {
                index: BulkTarget {
                    index: table.clone(),
                    id,
                },
            }));
            lines.push(BulkLine::Source(body));
        }
        if lines.is_empty() {
            return Err(DocQueryError::invalid_input("Data cannot be empty"));
        }
        debug!(table = %table, documents = lines.len() / 2, "built bulk payload");
        Ok(BulkPayload { lines })
    }

    pub fn find_by_id(table: &str, id: &str) -> Result<DocumentRef> {
        Ok(DocumentRef {
            table: Self::check_table(table)?,
            id: Self::check_id(id)?,
        })
    }

    pub fn update_by_id(table: &str, id: &str, partial: Document) -> Result<UpdatePayload> {
        let table = Self::check_table(table)?;
        let id = Self::check_id(id)?;
        if partial.is_empty() {
            return Err(DocQueryError::invalid_input("Data cannot be empty"));
        }
        Ok(UpdatePayload {
            table,
            id,
            body: UpdateBody { doc: partial },
        })
    }

    pub fn delete_by_id(table: &str, id: &str) -> Result<DocumentRef> {
        Self::find_by_id(table, id)
    }

    fn check_table(table: &str) -> Result<String> {
        if table.is_empty() {
            return Err(DocQueryError::invalid_input("Table name cannot be empty"));
        }
        Ok(table.to_string())
    }

    fn check_id(id: &str) -> Result<DocumentId> {
        if id.is_empty() {
            return Err(DocQueryError::invalid_input("Id cannot be empty"));
        }
        Ok(id.to_string())
    }
}

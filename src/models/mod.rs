pub mod condition;
pub mod document;
pub mod response;

pub use condition::{Condition, Operator, Predicate, RangeBounds, RangeValue};
pub use document::{Document, DocumentId, ID_FIELD};
pub use response::{
    Acknowledged, BulkItemResult, BulkResult, GetResult, Hit, Hits, SearchResult, TotalHits,
    WriteResult,
};

//! Model types shared by the scanner, the extractor and the driver.
//!
//! `MetadataNode` is the backend-agnostic view of a stream dictionary;
//! the report types describe what a run produced.

mod metadata;
mod report;

pub use metadata::{MetadataNode, MetadataValue};
pub use report::{ExtractionResult, ExtractionStatus, ObjectId, RunSummary, StreamReport};

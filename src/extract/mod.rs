//! Stream extraction: per-stream decode decisions and the document loop.

mod driver;
mod extractor;

pub use driver::{prepare_output_dir, ExtractionDriver};
pub use extractor::StreamExtractor;

use crate::model::StreamReport;

/// Receives a report after each stream artifact is written.
///
/// Closures taking `&StreamReport` implement this trait.
pub trait ExtractionObserver {
    /// Called once per stream, in processing order.
    fn on_stream(&mut self, report: &StreamReport);
}

impl<F: FnMut(&StreamReport)> ExtractionObserver for F {
    fn on_stream(&mut self, report: &StreamReport) {
        self(report)
    }
}

/// Observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ExtractionObserver for NullObserver {
    fn on_stream(&mut self, _report: &StreamReport) {}
}

//! # unstream
//!
//! Stream payload extraction for PDF documents.
//!
//! Every stream object in a document is written to its own file. Filters
//! are reversed when that yields the original bytes; streams carrying lossy
//! image codecs (`DCTDecode`, `JPXDecode`), or whose filters fail to decode,
//! are written exactly as stored.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unstream::{extract_file, ExtractOptions, StreamReport};
//!
//! fn main() -> unstream::Result<()> {
//!     let options = ExtractOptions::default();
//!     let mut print = |report: &StreamReport| {
//!         println!("{} -> {}", report.object, report.artifact.display());
//!     };
//!     let summary = extract_file("document.pdf", &options, &mut print)?;
//!     println!("{} streams", summary.stream_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`policy`]: which filters may be reversed
//! - [`scan`]: decode level resolution and dictionary rendering
//! - [`extract`]: per-stream extraction and the document loop
//! - [`backend`]: document access (`lopdf`) and filter decoding

pub mod backend;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod policy;
pub mod scan;

// Re-export commonly used types
pub use backend::{DocumentBackend, LopdfBackend, PdfStream, StreamObject};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
pub use error::{DecodeError, Error, Result, ScanError};
pub use extract::{
    prepare_output_dir, ExtractionDriver, ExtractionObserver, NullObserver, StreamExtractor,
};
pub use model::{
    ExtractionResult, ExtractionStatus, MetadataNode, MetadataValue, ObjectId, RunSummary,
    StreamReport,
};
pub use options::ExtractOptions;
pub use policy::{classify, DecodeLevel};
pub use scan::{render_dictionary, resolve_level, ScanLimits};

use std::path::Path;

/// Extract every stream of a PDF file.
///
/// Parses `input`, recreates the output directory chosen by
/// [`ExtractOptions::output_dir_for`], and writes one artifact per stream.
/// `observer` sees each stream right after its artifact is written.
///
/// # Errors
///
/// Parse failures and artifact write failures abort the run. Per-stream
/// decode failures never do; those streams are written raw.
pub fn extract_file<P: AsRef<Path>>(
    input: P,
    options: &ExtractOptions,
    observer: &mut dyn ExtractionObserver,
) -> Result<RunSummary> {
    let input = input.as_ref();
    let backend = LopdfBackend::load_file(input)?.with_max_decoded_len(options.max_decoded_len);
    log::info!(
        "Loaded {} (PDF {}, {} objects)",
        input.display(),
        backend.version(),
        backend.object_ids().len()
    );
    if backend.is_encrypted() {
        log::warn!(
            "{} is encrypted; payloads are written as lopdf decrypted them",
            input.display()
        );
    }

    let output_dir = options.output_dir_for(input);
    prepare_output_dir(&output_dir)?;

    ExtractionDriver::new(options.clone()).run(&backend, &output_dir, observer)
}

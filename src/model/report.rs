//! Per-stream extraction outcome and run summary.

use std::path::PathBuf;

use serde::Serialize;

use crate::policy::DecodeLevel;

/// Object number and generation.
pub type ObjectId = (u32, u16);

/// How the bytes of an [`ExtractionResult`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// The filter chain was reversed.
    Decoded,
    /// A lossy filter is present, decoding was skipped.
    FilterOmitted,
    /// Decoding was attempted and failed.
    FilterNotSupported,
    /// The dictionary walk ran out of budget, decoding was skipped.
    ScanAborted,
}

impl ExtractionStatus {
    /// Console annotation for the status, `None` for a clean decode.
    pub fn annotation(&self) -> Option<&'static str> {
        match self {
            ExtractionStatus::Decoded => None,
            ExtractionStatus::FilterOmitted => Some("(filter omitted)"),
            ExtractionStatus::FilterNotSupported => Some("(filter not supported)"),
            ExtractionStatus::ScanAborted => Some("(filter scan aborted)"),
        }
    }
}

/// Bytes produced for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Payload to persist
    pub data: Vec<u8>,

    /// Level resolved from the stream dictionary
    pub level: DecodeLevel,

    /// Outcome of the decode attempt
    pub status: ExtractionStatus,
}

impl ExtractionResult {
    /// True when the payload is the raw stream data.
    pub fn used_fallback(&self) -> bool {
        self.status != ExtractionStatus::Decoded
    }
}

/// What happened to one stream during a run.
#[derive(Debug, Clone, Serialize)]
pub struct StreamReport {
    /// Object number
    pub object: u32,

    /// Generation number
    pub generation: u16,

    /// Resolved decode level
    pub level: DecodeLevel,

    /// Extraction outcome
    pub status: ExtractionStatus,

    /// Whether raw bytes were written
    pub used_fallback: bool,

    /// Number of bytes written
    pub bytes: usize,

    /// Path of the written artifact
    pub artifact: PathBuf,

    /// Diagnostic rendering of the stream dictionary
    pub dictionary: String,
}

impl StreamReport {
    /// Object identity as a tuple.
    pub fn id(&self) -> ObjectId {
        (self.object, self.generation)
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Directory the artifacts were written to
    pub output_dir: PathBuf,

    /// Number of objects enumerated, streams or not
    pub objects_seen: usize,

    /// One entry per stream, in enumeration order
    pub streams: Vec<StreamReport>,
}

impl RunSummary {
    /// Number of stream objects processed.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Number of streams written without decoding.
    pub fn fallback_count(&self) -> usize {
        self.streams.iter().filter(|s| s.used_fallback).count()
    }
}

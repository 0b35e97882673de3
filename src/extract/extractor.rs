//! Per-stream decode decision with raw fallback.

use crate::backend::StreamObject;
use crate::model::{ExtractionResult, ExtractionStatus};
use crate::policy::DecodeLevel;
use crate::scan::{resolve_level, ScanLimits};

/// Turns one stream into bytes, decoding when it is safe and possible.
#[derive(Debug, Clone, Default)]
pub struct StreamExtractor {
    limits: ScanLimits,
}

impl StreamExtractor {
    /// Create an extractor with the given scan budget.
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits }
    }

    /// Extract a stream's payload.
    ///
    /// Never fails: a lossy filter, an exhausted scan budget or a failed
    /// decode all yield the raw bytes with a status saying why.
    pub fn extract<S: StreamObject + ?Sized>(&self, stream: &S) -> ExtractionResult {
        let (num, gen) = stream.id();

        let level = match resolve_level(stream.dictionary(), DecodeLevel::All, &self.limits) {
            Ok(level) => level,
            Err(e) => {
                log::warn!("Object {} {}: {}; writing raw bytes", num, gen, e);
                return raw(stream, DecodeLevel::None, ExtractionStatus::ScanAborted);
            }
        };

        if level == DecodeLevel::None {
            log::debug!("Object {} {}: lossy filter, decoding skipped", num, gen);
            return raw(stream, level, ExtractionStatus::FilterOmitted);
        }

        match stream.decoded_bytes(DecodeLevel::All) {
            Ok(data) => {
                log::debug!("Object {} {}: decoded {} bytes", num, gen, data.len());
                ExtractionResult {
                    data,
                    level,
                    status: ExtractionStatus::Decoded,
                }
            }
            Err(e) => {
                log::warn!("Object {} {}: {}; writing raw bytes", num, gen, e);
                raw(stream, level, ExtractionStatus::FilterNotSupported)
            }
        }
    }
}

fn raw<S: StreamObject + ?Sized>(
    stream: &S,
    level: DecodeLevel,
    status: ExtractionStatus,
) -> ExtractionResult {
    ExtractionResult {
        data: stream.raw_bytes().to_vec(),
        level,
        status,
    }
}

//! Error types for unstream library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort an extraction run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input or preparing the output directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// An output artifact could not be created or written.
    #[error("Cannot write artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

/// Failure to reverse the filter chain of a single stream.
///
/// Never fatal: the extractor answers it with the raw stream bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The filter is not one the decoder knows how to reverse.
    #[error("unsupported filter /{0}")]
    UnsupportedFilter(String),

    /// The payload does not decode under the declared filter.
    #[error("corrupt /{filter} data: {reason}")]
    Corrupt { filter: String, reason: String },

    /// `/DecodeParms` values are out of range or inconsistent.
    #[error("invalid decode parameters: {0}")]
    InvalidParameters(String),

    /// Decoded output grew past the configured cap.
    #[error("decoded output exceeds {0} bytes")]
    OutputLimit(usize),

    /// `/Filter` is neither a name nor an array of names.
    #[error("malformed /Filter entry")]
    MalformedFilter,
}

impl DecodeError {
    pub(crate) fn corrupt(filter: &str, reason: impl Into<String>) -> Self {
        DecodeError::Corrupt {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

/// The metadata walk ran out of budget before finishing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// Nesting went deeper than the configured limit.
    #[error("metadata nesting exceeds depth {0}")]
    DepthExceeded(usize),

    /// More values were visited than the configured budget allows.
    #[error("metadata walk exceeds {0} values")]
    NodeBudgetExceeded(usize),
}

//! Document backend abstraction layer.
//!
//! The extractor and driver only see [`DocumentBackend`] and
//! [`StreamObject`]; [`LopdfBackend`] is the concrete implementation
//! backed by `lopdf`.

pub mod filters;
mod lopdf_backend;

pub use lopdf_backend::{LopdfBackend, PdfStream};

use crate::error::{DecodeError, Result};
use crate::model::{MetadataNode, ObjectId};
use crate::policy::DecodeLevel;

/// A stream object: a dictionary plus a payload.
pub trait StreamObject {
    /// Object number and generation.
    fn id(&self) -> ObjectId;

    /// The stream dictionary.
    fn dictionary(&self) -> &MetadataNode;

    /// Payload exactly as stored in the file.
    fn raw_bytes(&self) -> &[u8];

    /// Payload with filters reversed up to `level`.
    ///
    /// `DecodeLevel::None` returns the raw bytes.
    fn decoded_bytes(&self, level: DecodeLevel) -> std::result::Result<Vec<u8>, DecodeError>;
}

/// Abstract interface for enumerating the objects of a parsed document.
pub trait DocumentBackend {
    /// Stream view produced by this backend.
    type Stream: StreamObject;

    /// Every object id, in the order the document exposes them.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Stream view of an object, or `None` if the object is not a stream.
    ///
    /// Fails when `id` cannot be resolved.
    fn stream(&self, id: ObjectId) -> Result<Option<Self::Stream>>;
}

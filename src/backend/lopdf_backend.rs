//! `lopdf`-backed document access.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object};

use super::filters::{self, DEFAULT_MAX_DECODED_LEN};
use super::{DocumentBackend, StreamObject};
use crate::detect::detect_format_from_path;
use crate::error::{DecodeError, Error, Result};
use crate::model::{MetadataNode, MetadataValue, ObjectId};
use crate::policy::DecodeLevel;

/// Nesting below this depth is not converted.
const MAX_CONVERT_DEPTH: usize = 256;

/// Values converted per stream dictionary, references included.
const MAX_CONVERT_NODES: usize = 100_000;

/// Longest string literal shown in a diagnostic label.
const MAX_LABEL_CHARS: usize = 32;

/// Concrete [`DocumentBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    max_decoded_len: usize,
}

impl LopdfBackend {
    /// Load from a file path.
    ///
    /// Fails with [`Error::UnknownFormat`] when the file does not start with
    /// a PDF header, and with [`Error::PdfParse`] when lopdf rejects it.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        if format.header_offset > 0 {
            log::debug!(
                "{}: header found at byte {}",
                path.display(),
                format.header_offset
            );
        }
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already parsed document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self {
            doc,
            max_decoded_len: DEFAULT_MAX_DECODED_LEN,
        }
    }

    /// Cap the decoded size of each stream.
    pub fn with_max_decoded_len(mut self, len: usize) -> Self {
        self.max_decoded_len = len;
        self
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

impl DocumentBackend for LopdfBackend {
    type Stream = PdfStream;

    fn object_ids(&self) -> Vec<ObjectId> {
        self.doc.objects.keys().copied().collect()
    }

    fn stream(&self, id: ObjectId) -> Result<Option<PdfStream>> {
        let object = self
            .doc
            .objects
            .get(&id)
            .ok_or_else(|| Error::PdfParse(format!("object {} {} R not found", id.0, id.1)))?;

        match object {
            Object::Stream(stream) => {
                let dictionary = Converter::new(&self.doc, id).dictionary(&stream.dict, 0);
                Ok(Some(
                    PdfStream::new(id, dictionary, stream.content.clone())
                        .with_max_decoded_len(self.max_decoded_len),
                ))
            }
            _ => Ok(None),
        }
    }
}

/// An owned stream: converted dictionary plus raw payload.
#[derive(Debug, Clone)]
pub struct PdfStream {
    id: ObjectId,
    dictionary: MetadataNode,
    raw: Vec<u8>,
    max_decoded_len: usize,
}

impl PdfStream {
    /// Create a stream from its parts.
    pub fn new(id: ObjectId, dictionary: MetadataNode, raw: Vec<u8>) -> Self {
        Self {
            id,
            dictionary,
            raw,
            max_decoded_len: DEFAULT_MAX_DECODED_LEN,
        }
    }

    /// Cap the decoded size.
    pub fn with_max_decoded_len(mut self, len: usize) -> Self {
        self.max_decoded_len = len;
        self
    }
}

impl StreamObject for PdfStream {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn dictionary(&self) -> &MetadataNode {
        &self.dictionary
    }

    fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn decoded_bytes(&self, level: DecodeLevel) -> std::result::Result<Vec<u8>, DecodeError> {
        match level {
            DecodeLevel::None => Ok(self.raw.clone()),
            DecodeLevel::All => {
                filters::decode_stream(&self.dictionary, &self.raw, self.max_decoded_len)
            }
        }
    }
}

/// Converts lopdf objects to [`MetadataValue`]s, following indirect
/// references.
///
/// A reference already being expanded on the current path is a cycle and
/// stays an `n g R` label, as does a reference to a missing object. Depth
/// and total value count are capped.
struct Converter<'a> {
    doc: &'a LopdfDocument,
    path: Vec<ObjectId>,
    remaining: usize,
}

impl<'a> Converter<'a> {
    /// Converter for the dictionary of object `root`.
    fn new(doc: &'a LopdfDocument, root: ObjectId) -> Self {
        Self {
            doc,
            path: vec![root],
            remaining: MAX_CONVERT_NODES,
        }
    }

    /// Convert a `lopdf::Dictionary`, keeping entry order.
    fn dictionary(&mut self, dict: &lopdf::Dictionary, depth: usize) -> MetadataNode {
        dict.iter()
            .map(|(key, value)| {
                (
                    String::from_utf8_lossy(key).into_owned(),
                    self.object(value, depth + 1),
                )
            })
            .collect()
    }

    fn object(&mut self, obj: &Object, depth: usize) -> MetadataValue {
        if depth > MAX_CONVERT_DEPTH || self.remaining == 0 {
            return MetadataValue::Other("...".to_string());
        }
        self.remaining -= 1;
        match obj {
            Object::Name(n) => MetadataValue::Name(String::from_utf8_lossy(n).into_owned()),
            Object::Integer(i) => MetadataValue::Number(*i as f64),
            Object::Real(r) => MetadataValue::Number(f64::from(*r)),
            Object::Array(arr) => MetadataValue::Array(
                arr.iter()
                    .map(|item| self.object(item, depth + 1))
                    .collect(),
            ),
            Object::Dictionary(d) => MetadataValue::Dictionary(self.dictionary(d, depth)),
            Object::Stream(s) => MetadataValue::Dictionary(self.dictionary(&s.dict, depth)),
            Object::Reference(id) => self.reference(*id, depth),
            Object::String(bytes, _) => MetadataValue::Other(string_label(bytes)),
            Object::Boolean(b) => MetadataValue::Other(b.to_string()),
            Object::Null => MetadataValue::Other("null".to_string()),
        }
    }

    fn reference(&mut self, id: ObjectId, depth: usize) -> MetadataValue {
        let label = MetadataValue::Other(format!("{} {} R", id.0, id.1));
        if self.path.contains(&id) {
            log::debug!("Reference cycle through {} {} R", id.0, id.1);
            return label;
        }
        let doc = self.doc;
        let Ok(target) = doc.get_object(id) else {
            return label;
        };

        self.path.push(id);
        let value = self.object(target, depth + 1);
        self.path.pop();
        value
    }
}

fn string_label(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut label: String = text.chars().take(MAX_LABEL_CHARS).collect();
    if text.chars().count() > MAX_LABEL_CHARS {
        label.push_str("...");
    }
    format!("({})", label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn sample_document() -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        doc.objects.insert(
            (4, 0),
            Object::Stream(Stream::new(
                dictionary! { "Filter" => "DCTDecode", "Width" => 2 },
                vec![0xFF, 0xD8, 0xFF, 0xD9],
            )),
        );
        doc.objects
            .insert((5, 0), Object::Dictionary(dictionary! { "Type" => "Catalog" }));
        doc
    }

    #[test]
    fn test_object_ids_ascending() {
        let backend = LopdfBackend::from_document(sample_document());
        assert_eq!(backend.object_ids(), vec![(4, 0), (5, 0)]);
    }

    #[test]
    fn test_stream_view() {
        let backend = LopdfBackend::from_document(sample_document());

        let stream = backend.stream((4, 0)).unwrap().unwrap();
        assert_eq!(stream.id(), (4, 0));
        assert_eq!(stream.raw_bytes(), &[0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(
            stream.dictionary().get("Filter").and_then(|v| v.as_name()),
            Some("DCTDecode")
        );
        assert_eq!(
            stream.dictionary().get("Width").and_then(|v| v.as_number()),
            Some(2.0)
        );

        assert!(backend.stream((5, 0)).unwrap().is_none());
        assert!(matches!(backend.stream((99, 0)), Err(Error::PdfParse(_))));
    }

    fn stream_dictionary(doc: LopdfDocument, id: ObjectId) -> MetadataNode {
        let backend = LopdfBackend::from_document(doc);
        backend.stream(id).unwrap().unwrap().dictionary().clone()
    }

    #[test]
    fn test_convert_object_labels() {
        let doc = LopdfDocument::with_version("1.5");
        let mut converter = Converter::new(&doc, (1, 0));

        assert_eq!(
            converter.object(&Object::Reference((12, 0)), 0),
            MetadataValue::Other("12 0 R".to_string())
        );
        assert_eq!(
            converter.object(&Object::Boolean(true), 0),
            MetadataValue::Other("true".to_string())
        );
        assert_eq!(
            converter.object(&Object::Real(0.5), 0),
            MetadataValue::Number(0.5)
        );
        assert_eq!(string_label(b"abc"), "(abc)");
        assert_eq!(string_label(&[b'x'; 40]), format!("({}...)", "x".repeat(32)));
    }

    #[test]
    fn test_indirect_filter_is_resolved() {
        let mut doc = LopdfDocument::with_version("1.5");
        doc.objects.insert(
            (9, 0),
            Object::Array(vec![Object::Name(b"DCTDecode".to_vec())]),
        );
        doc.objects.insert(
            (3, 0),
            Object::Stream(Stream::new(
                dictionary! { "Filter" => Object::Reference((9, 0)) },
                vec![0xFF, 0xD8],
            )),
        );

        let dict = stream_dictionary(doc, (3, 0));
        assert_eq!(
            dict.get("Filter"),
            Some(&MetadataValue::Array(vec![MetadataValue::name("DCTDecode")]))
        );
    }

    #[test]
    fn test_indirect_decode_parms_are_resolved() {
        let mut doc = LopdfDocument::with_version("1.5");
        doc.objects.insert(
            (9, 0),
            Object::Dictionary(dictionary! { "Predictor" => 12, "Columns" => 3 }),
        );
        doc.objects.insert(
            (4, 0),
            Object::Stream(Stream::new(
                dictionary! {
                    "Filter" => "FlateDecode",
                    "DecodeParms" => Object::Reference((9, 0)),
                },
                Vec::new(),
            )),
        );

        let dict = stream_dictionary(doc, (4, 0));
        let parms = dict.get("DecodeParms").and_then(|v| v.as_dictionary()).unwrap();
        assert_eq!(parms.get("Predictor").and_then(|v| v.as_number()), Some(12.0));
        assert_eq!(parms.get("Columns").and_then(|v| v.as_number()), Some(3.0));
    }

    #[test]
    fn test_reference_cycle_stays_a_label() {
        let mut doc = LopdfDocument::with_version("1.5");
        doc.objects.insert(
            (7, 0),
            Object::Dictionary(dictionary! { "Next" => Object::Reference((8, 0)) }),
        );
        doc.objects.insert(
            (8, 0),
            Object::Dictionary(dictionary! { "Next" => Object::Reference((7, 0)) }),
        );
        doc.objects.insert(
            (5, 0),
            Object::Stream(Stream::new(
                dictionary! {
                    "Parent" => Object::Reference((7, 0)),
                    "Self" => Object::Reference((5, 0)),
                },
                Vec::new(),
            )),
        );

        let dict = stream_dictionary(doc, (5, 0));
        let seven = dict.get("Parent").and_then(|v| v.as_dictionary()).unwrap();
        let eight = seven.get("Next").and_then(|v| v.as_dictionary()).unwrap();
        assert_eq!(
            eight.get("Next"),
            Some(&MetadataValue::Other("7 0 R".to_string()))
        );
        assert_eq!(
            dict.get("Self"),
            Some(&MetadataValue::Other("5 0 R".to_string()))
        );
    }

    #[test]
    fn test_shared_reference_is_expanded_each_time() {
        let mut doc = LopdfDocument::with_version("1.5");
        doc.objects
            .insert((9, 0), Object::Dictionary(dictionary! { "Columns" => 4 }));
        doc.objects.insert(
            (6, 0),
            Object::Stream(Stream::new(
                dictionary! {
                    "DecodeParms" => Object::Array(vec![
                        Object::Reference((9, 0)),
                        Object::Reference((9, 0)),
                    ]),
                },
                Vec::new(),
            )),
        );

        let dict = stream_dictionary(doc, (6, 0));
        let expected = MetadataValue::Dictionary(MetadataNode::new().with("Columns", 4));
        assert_eq!(
            dict.get("DecodeParms"),
            Some(&MetadataValue::Array(vec![expected.clone(), expected]))
        );
    }

    #[test]
    fn test_decoded_bytes_none_is_raw() {
        let stream = PdfStream::new(
            (1, 0),
            MetadataNode::new().with("Filter", MetadataValue::name("FlateDecode")),
            b"garbage".to_vec(),
        );
        assert_eq!(stream.decoded_bytes(DecodeLevel::None).unwrap(), b"garbage");
        assert!(stream.decoded_bytes(DecodeLevel::All).is_err());
    }

    #[test]
    fn test_load_file_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<!DOCTYPE html><html></html>").unwrap();

        assert!(matches!(
            LopdfBackend::load_file(&path),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_is_encrypted() {
        let mut doc = sample_document();
        assert!(!LopdfBackend::from_document(doc.clone()).is_encrypted());

        doc.trailer.set("Encrypt", Object::Reference((20, 0)));
        assert!(LopdfBackend::from_document(doc).is_encrypted());
    }
}

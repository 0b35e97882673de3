//! Decode policy: which filters are worth reversing.

use serde::Serialize;

/// How far a stream's filter chain should be reversed.
///
/// Ordered so that `None < All`; combining levels always keeps the stricter
/// one, so a stream only decodes when every filter it mentions allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeLevel {
    /// Pass the payload through untouched.
    None,
    /// Reverse every filter in the chain.
    All,
}

impl DecodeLevel {
    /// The stricter of two levels.
    pub fn restrict(self, other: DecodeLevel) -> DecodeLevel {
        self.min(other)
    }
}

impl std::fmt::Display for DecodeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeLevel::None => f.write_str("none"),
            DecodeLevel::All => f.write_str("all"),
        }
    }
}

/// Image codecs whose "decoded" form is pixels rather than the original bytes.
///
/// `CCITTFaxDecode` is not listed: it classifies as `All` and ends up raw
/// through the unsupported-filter path instead.
const LOSSY_FILTERS: &[&str] = &["DCTDecode", "JPXDecode"];

/// Map a filter name (without the leading `/`) to a decode level.
///
/// Unknown names are optimistic: decoding is attempted and the extractor
/// falls back to raw bytes if the chain cannot be reversed.
pub fn classify(filter: &str) -> DecodeLevel {
    if LOSSY_FILTERS.contains(&filter) {
        DecodeLevel::None
    } else {
        DecodeLevel::All
    }
}

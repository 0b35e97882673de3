//! Read-only view of a stream dictionary.

/// A single value inside a stream dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// A name such as `FlateDecode`, stored without the leading `/`.
    Name(String),
    /// Integer or real number.
    Number(f64),
    /// Ordered sequence of values.
    Array(Vec<MetadataValue>),
    /// Nested dictionary.
    Dictionary(MetadataNode),
    /// Anything else (strings, references, booleans, null), kept as a
    /// short label for diagnostics.
    Other(String),
}

impl MetadataValue {
    /// Create a name value.
    pub fn name(name: impl Into<String>) -> Self {
        MetadataValue::Name(name.into())
    }

    /// Get the name, if this is a name value.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            MetadataValue::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Get the number, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the nested dictionary, if any.
    pub fn as_dictionary(&self) -> Option<&MetadataNode> {
        match self {
            MetadataValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

impl From<i32> for MetadataValue {
    fn from(n: i32) -> Self {
        MetadataValue::Number(f64::from(n))
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Number(n as f64)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::Number(n)
    }
}

impl From<MetadataNode> for MetadataValue {
    fn from(node: MetadataNode) -> Self {
        MetadataValue::Dictionary(node)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(items: Vec<MetadataValue>) -> Self {
        MetadataValue::Array(items)
    }
}

/// Key/value entries of a dictionary in the order the document presents them.
///
/// Keys are stored without the leading `/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataNode {
    entries: Vec<(String, MetadataValue)>,
}

impl MetadataNode {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate over entries in presentation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, MetadataValue)> for MetadataNode {
    fn from_iter<I: IntoIterator<Item = (K, MetadataValue)>>(iter: I) -> Self {
        let mut node = MetadataNode::new();
        for (k, v) in iter {
            node.insert(k, v);
        }
        node
    }
}

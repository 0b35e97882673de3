//! Decode level resolution over a stream dictionary.

use crate::error::ScanError;
use crate::model::{MetadataNode, MetadataValue};
use crate::policy::{classify, DecodeLevel};

use super::ScanLimits;

/// Resolve the decode level for a dictionary, starting from `current`.
///
/// Every name reachable through nested arrays and dictionaries is classified
/// and the strictest level wins. The result never exceeds `current`, and the
/// walk stops as soon as it reaches [`DecodeLevel::None`].
///
/// The walk uses an explicit stack bounded by `limits`; a dictionary nested
/// deeper than `max_depth`, or containing more than `max_nodes` values, is
/// rejected with a [`ScanError`] rather than walked.
///
/// # Example
///
/// ```
/// use unstream::model::{MetadataNode, MetadataValue};
/// use unstream::policy::DecodeLevel;
/// use unstream::scan::{resolve_level, ScanLimits};
///
/// let dict = MetadataNode::new().with(
///     "Filter",
///     vec![MetadataValue::name("FlateDecode"), MetadataValue::name("DCTDecode")],
/// );
/// let level = resolve_level(&dict, DecodeLevel::All, &ScanLimits::default()).unwrap();
/// assert_eq!(level, DecodeLevel::None);
/// ```
pub fn resolve_level(
    node: &MetadataNode,
    current: DecodeLevel,
    limits: &ScanLimits,
) -> Result<DecodeLevel, ScanError> {
    if current == DecodeLevel::None {
        return Ok(DecodeLevel::None);
    }

    let mut level = current;
    let mut visited = 0usize;
    // Reversed so values pop in presentation order.
    let mut pending: Vec<(&MetadataValue, usize)> =
        node.iter().rev().map(|(_, value)| (value, 1)).collect();

    while let Some((value, depth)) = pending.pop() {
        if depth > limits.max_depth {
            return Err(ScanError::DepthExceeded(limits.max_depth));
        }
        visited += 1;
        if visited > limits.max_nodes {
            return Err(ScanError::NodeBudgetExceeded(limits.max_nodes));
        }

        match value {
            MetadataValue::Name(name) => {
                level = level.restrict(classify(name));
                if level == DecodeLevel::None {
                    return Ok(level);
                }
            }
            MetadataValue::Array(items) => {
                pending.extend(items.iter().rev().map(|item| (item, depth + 1)));
            }
            MetadataValue::Dictionary(inner) => {
                pending.extend(inner.iter().rev().map(|(_, item)| (item, depth + 1)));
            }
            MetadataValue::Number(_) | MetadataValue::Other(_) => {}
        }
    }

    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> MetadataValue {
        MetadataValue::name(n)
    }

    fn resolve(node: &MetadataNode) -> DecodeLevel {
        resolve_level(node, DecodeLevel::All, &ScanLimits::default()).unwrap()
    }

    #[test]
    fn test_empty_dictionary_decodes() {
        assert_eq!(resolve(&MetadataNode::new()), DecodeLevel::All);
    }

    #[test]
    fn test_single_generic_filter() {
        let dict = MetadataNode::new()
            .with("Length", 120)
            .with("Filter", name("FlateDecode"));
        assert_eq!(resolve(&dict), DecodeLevel::All);
    }

    #[test]
    fn test_single_lossy_filter() {
        let dict = MetadataNode::new()
            .with("Filter", name("DCTDecode"))
            .with("Length", 4096);
        assert_eq!(resolve(&dict), DecodeLevel::None);
    }

    #[test]
    fn test_lossy_filter_in_array() {
        let dict = MetadataNode::new().with(
            "Filter",
            vec![name("ASCII85Decode"), name("JPXDecode")],
        );
        assert_eq!(resolve(&dict), DecodeLevel::None);
    }

    #[test]
    fn test_lossy_filter_in_array_of_dictionaries() {
        let parms = MetadataNode::new().with("Filter", name("DCTDecode"));
        let dict = MetadataNode::new()
            .with("Filter", name("FlateDecode"))
            .with("DecodeParms", vec![MetadataValue::from(parms)]);
        assert_eq!(resolve(&dict), DecodeLevel::None);
    }

    #[test]
    fn test_lossy_filter_in_direct_subdictionary() {
        let inner = MetadataNode::new().with("F", name("JPXDecode"));
        let dict = MetadataNode::new().with("Params", inner);
        assert_eq!(resolve(&dict), DecodeLevel::None);
    }

    #[test]
    fn test_lossy_filter_in_nested_array() {
        let dict = MetadataNode::new().with(
            "Filter",
            vec![MetadataValue::Array(vec![name("DCTDecode")])],
        );
        assert_eq!(resolve(&dict), DecodeLevel::None);
    }

    #[test]
    fn test_fax_filter_is_not_special() {
        let dict = MetadataNode::new().with("Filter", name("CCITTFaxDecode"));
        assert_eq!(resolve(&dict), DecodeLevel::All);
    }

    #[test]
    fn test_never_upgrades() {
        let dict = MetadataNode::new().with("Filter", name("FlateDecode"));
        let level = resolve_level(&dict, DecodeLevel::None, &ScanLimits::default()).unwrap();
        assert_eq!(level, DecodeLevel::None);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = MetadataNode::new()
            .with("Filter", name("DCTDecode"))
            .with("Type", name("XObject"));
        let b = MetadataNode::new()
            .with("Type", name("XObject"))
            .with("Filter", name("DCTDecode"));
        assert_eq!(resolve(&a), resolve(&b));
    }

    #[test]
    fn test_other_values_are_ignored() {
        let dict = MetadataNode::new()
            .with("Length", MetadataValue::Other("12 0 R".to_string()))
            .with("Name", MetadataValue::Other("(DCTDecode)".to_string()));
        assert_eq!(resolve(&dict), DecodeLevel::All);
    }

    #[test]
    fn test_depth_limit() {
        let mut dict = MetadataNode::new().with("Filter", name("FlateDecode"));
        for _ in 0..10 {
            dict = MetadataNode::new().with("Next", dict);
        }

        let limits = ScanLimits::new().with_max_depth(5);
        assert_eq!(
            resolve_level(&dict, DecodeLevel::All, &limits),
            Err(ScanError::DepthExceeded(5))
        );

        let limits = ScanLimits::new().with_max_depth(11);
        assert_eq!(
            resolve_level(&dict, DecodeLevel::All, &limits),
            Ok(DecodeLevel::All)
        );
    }

    #[test]
    fn test_node_budget() {
        let items: Vec<MetadataValue> = (0..100).map(MetadataValue::from).collect();
        let dict = MetadataNode::new().with("Widths", items);

        let limits = ScanLimits::new().with_max_nodes(50);
        assert_eq!(
            resolve_level(&dict, DecodeLevel::All, &limits),
            Err(ScanError::NodeBudgetExceeded(50))
        );
    }

    #[test]
    fn test_lossy_name_before_budget_short_circuits() {
        let mut items = vec![name("DCTDecode")];
        items.extend((0..100).map(MetadataValue::from));
        let dict = MetadataNode::new().with("Filter", items);

        let limits = ScanLimits::new().with_max_nodes(10);
        assert_eq!(
            resolve_level(&dict, DecodeLevel::All, &limits),
            Ok(DecodeLevel::None)
        );
    }
}

//! Diagnostic rendering of stream dictionaries.

use crate::model::{MetadataNode, MetadataValue};

/// Nesting below this depth is collapsed to `<< ... >>`.
const MAX_RENDER_DEPTH: usize = 32;

/// Render a dictionary as space-separated tokens, e.g.
/// `<< /Filter [ /ASCII85Decode /FlateDecode ] /Length 512 >>`.
///
/// Output is for humans only; nothing parses it back.
pub fn render_dictionary(node: &MetadataNode) -> String {
    let mut tokens = Vec::new();
    push_dictionary(node, 0, &mut tokens);
    tokens.join(" ")
}

fn push_dictionary(node: &MetadataNode, depth: usize, tokens: &mut Vec<String>) {
    if depth >= MAX_RENDER_DEPTH {
        tokens.push("<< ... >>".to_string());
        return;
    }
    tokens.push("<<".to_string());
    for (key, value) in node.iter() {
        tokens.push(format!("/{}", key));
        push_value(value, depth, tokens);
    }
    tokens.push(">>".to_string());
}

fn push_value(value: &MetadataValue, depth: usize, tokens: &mut Vec<String>) {
    match value {
        MetadataValue::Name(name) => tokens.push(format!("/{}", name)),
        MetadataValue::Number(n) => tokens.push(n.to_string()),
        MetadataValue::Array(items) => {
            if depth + 1 >= MAX_RENDER_DEPTH {
                tokens.push("[ ... ]".to_string());
                return;
            }
            tokens.push("[".to_string());
            for item in items {
                push_value(item, depth + 1, tokens);
            }
            tokens.push("]".to_string());
        }
        MetadataValue::Dictionary(inner) => push_dictionary(inner, depth + 1, tokens),
        MetadataValue::Other(label) => tokens.push(label.clone()),
    }
}

//! Document metadata values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{RawNode, inlines_text};

/// A metadata value as found in the document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum MetaValue {
    MetaString(String),
    MetaInlines(Vec<Value>),
    MetaBool(bool),
    /// Maps, lists and block values, kept as-is.
    Other(RawNode),
}

impl MetaValue {
    /// Inline value holding a single word, the form pandoc produces for a
    /// one-word YAML scalar.
    #[must_use]
    pub fn word(text: &str) -> Self {
        Self::MetaInlines(vec![serde_json::json!({"t": "Str", "c": text})])
    }

    /// Flattened text content. `None` for values that are not text.
    #[must_use]
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Self::MetaString(s) => Some(s.clone()),
            Self::MetaInlines(inlines) => Some(inlines_text(inlines)),
            Self::MetaBool(_) => None,
            Self::Other(node) => match (node.t.as_str(), &node.c) {
                // A paragraph-valued scalar: [Plain [inlines]]
                ("MetaBlocks", Some(Value::Array(blocks))) => {
                    let text = blocks
                        .iter()
                        .filter_map(|b| b.get("c").and_then(Value::as_array))
                        .map(|inlines| inlines_text(inlines))
                        .collect::<Vec<_>>()
                        .join(" ");
                    Some(text)
                }
                _ => None,
            },
        }
    }
}

impl TryFrom<RawNode> for MetaValue {
    type Error = serde_json::Error;

    fn try_from(node: RawNode) -> Result<Self, Self::Error> {
        match node.t.as_str() {
            "MetaString" => Ok(Self::MetaString(serde_json::from_value(node.contents())?)),
            "MetaInlines" => Ok(Self::MetaInlines(serde_json::from_value(node.contents())?)),
            "MetaBool" => Ok(Self::MetaBool(serde_json::from_value(node.contents())?)),
            _ => Ok(Self::Other(node)),
        }
    }
}

impl From<MetaValue> for RawNode {
    fn from(value: MetaValue) -> Self {
        match value {
            MetaValue::MetaString(s) => RawNode::new("MetaString", Value::String(s)),
            MetaValue::MetaInlines(inlines) => RawNode::new("MetaInlines", Value::Array(inlines)),
            MetaValue::MetaBool(b) => RawNode::new("MetaBool", Value::Bool(b)),
            MetaValue::Other(node) => node,
        }
    }
}

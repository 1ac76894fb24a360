//! Block-level elements.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::node::RawNode;

/// Image title that makes pandoc render a lone image as a figure.
const FIGURE_TITLE: &str = "fig:";

/// Attribute triple attached to code blocks and images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttrWire", into = "AttrWire")]
pub struct Attr {
    /// Element identifier (`#id`).
    pub id: String,
    /// Classes (`.dot`, `.plantuml`, ...).
    pub classes: Vec<String>,
    /// Key/value attributes.
    pub attributes: Vec<(String, String)>,
}

type AttrWire = (String, Vec<String>, Vec<(String, String)>);

impl From<AttrWire> for Attr {
    fn from((id, classes, attributes): AttrWire) -> Self {
        Self {
            id,
            classes,
            attributes,
        }
    }
}

impl From<Attr> for AttrWire {
    fn from(attr: Attr) -> Self {
        (attr.id, attr.classes, attr.attributes)
    }
}

/// A fenced or indented code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub attr: Attr,
    pub text: String,
}

impl CodeBlock {
    #[must_use]
    pub fn new(classes: &[&str], text: impl Into<String>) -> Self {
        Self {
            attr: Attr {
                classes: classes.iter().map(|&c| c.to_owned()).collect(),
                ..Attr::default()
            },
            text: text.into(),
        }
    }

    /// Whether the block carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr.classes.iter().any(|c| c == class)
    }
}

/// A top-level block of a document.
///
/// Only the variants the pipeline rewrites are typed; everything else is
/// carried as [`Block::Other`]. Both [`Block::Image`] and
/// [`Block::ErrorDisplay`] are output forms: they serialize to a `Para`
/// holding one image and to a plain `CodeBlock` respectively, and parse back
/// as those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum Block {
    /// Paragraph of raw inline elements.
    Paragraph(Vec<Value>),
    /// Code block with attributes.
    CodeBlock(CodeBlock),
    /// A standalone image referencing `url`.
    Image { url: String },
    /// Diagnostic text shown in place of a block that failed to render.
    ErrorDisplay { attr: Attr, message: String },
    /// Any other block, untouched.
    Other(RawNode),
}

impl Block {
    /// Standalone image block.
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    /// Error block showing `message` verbatim in place of `code`.
    ///
    /// The identifier and key/value attributes carry over, so anchors to the
    /// block keep working. Classes are dropped.
    #[must_use]
    pub fn error_display(code: &CodeBlock, message: impl Into<String>) -> Self {
        Self::ErrorDisplay {
            attr: Attr {
                classes: Vec::new(),
                ..code.attr.clone()
            },
            message: message.into(),
        }
    }

    /// The code block, if this is one.
    #[must_use]
    pub fn as_code_block(&self) -> Option<&CodeBlock> {
        match self {
            Self::CodeBlock(code) => Some(code),
            _ => None,
        }
    }
}

impl TryFrom<RawNode> for Block {
    type Error = serde_json::Error;

    fn try_from(node: RawNode) -> Result<Self, Self::Error> {
        match node.t.as_str() {
            "Para" => Ok(Self::Paragraph(serde_json::from_value(node.contents())?)),
            "CodeBlock" => {
                let (attr, text): (Attr, String) = serde_json::from_value(node.contents())?;
                Ok(Self::CodeBlock(CodeBlock { attr, text }))
            }
            _ => Ok(Self::Other(node)),
        }
    }
}

impl From<Block> for RawNode {
    fn from(block: Block) -> Self {
        match block {
            Block::Paragraph(inlines) => RawNode::new("Para", Value::Array(inlines)),
            Block::CodeBlock(CodeBlock { attr, text }) => {
                RawNode::new("CodeBlock", json!([AttrWire::from(attr), text]))
            }
            Block::Image { url } => RawNode::new(
                "Para",
                json!([{
                    "t": "Image",
                    "c": [AttrWire::from(Attr::default()), [], [url, FIGURE_TITLE]],
                }]),
            ),
            Block::ErrorDisplay { attr, message } => {
                RawNode::new("CodeBlock", json!([AttrWire::from(attr), message]))
            }
            Block::Other(node) => node,
        }
    }
}

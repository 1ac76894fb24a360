//! Untyped pandoc AST nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pandoc element in its wire form: a tag and optional contents.
///
/// Elements the pipeline does not interpret are kept as `RawNode` so they
/// serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Element tag (`Para`, `Header`, `Str`, ...).
    pub t: String,
    /// Element contents; absent for nullary elements such as `Space`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Value>,
}

impl RawNode {
    pub(crate) fn new(t: &str, c: Value) -> Self {
        Self {
            t: t.to_owned(),
            c: Some(c),
        }
    }

    /// Contents, or `Null` for nullary elements.
    pub(crate) fn contents(self) -> Value {
        self.c.unwrap_or(Value::Null)
    }
}

/// Append the plain text of an inline element (and its children) to `out`.
pub(crate) fn push_inline_text(inline: &Value, out: &mut String) {
    let tag = inline.get("t").and_then(Value::as_str);
    match tag {
        Some("Str") => {
            if let Some(text) = inline.get("c").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("Space" | "SoftBreak" | "LineBreak") => out.push(' '),
        // Code and Math carry [attr/type, text]
        Some("Code" | "Math") => {
            if let Some(text) = inline.get("c").and_then(|c| c.get(1)).and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        _ => {
            if let Some(children) = inline.get("c") {
                push_children_text(children, out);
            }
        }
    }
}

fn push_children_text(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            for item in items {
                if item.get("t").is_some() {
                    push_inline_text(item, out);
                } else {
                    push_children_text(item, out);
                }
            }
        }
        Value::Object(_) => push_inline_text(value, out),
        _ => {}
    }
}

/// Plain text of a list of inlines.
pub(crate) fn inlines_text(inlines: &[Value]) -> String {
    let mut out = String::new();
    for inline in inlines {
        push_inline_text(inline, &mut out);
    }
    out
}

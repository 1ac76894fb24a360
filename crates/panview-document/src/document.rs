//! Whole-document container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::Block;
use crate::meta::MetaValue;

/// Error parsing or serializing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Malformed document JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Cannot serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A parsed pandoc document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Pandoc API version, echoed back unchanged.
    #[serde(rename = "pandoc-api-version")]
    pub api_version: Vec<Value>,
    #[serde(default)]
    pub meta: BTreeMap<String, MetaValue>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse pandoc's JSON output.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(DocumentError::Parse)
    }

    /// Serialize to pandoc's JSON input form.
    pub fn to_json(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(DocumentError::Serialize)
    }

    /// Plain text of metadata `key`, if present and textual.
    #[must_use]
    pub fn meta_text(&self, key: &str) -> Option<String> {
        self.meta.get(key).and_then(MetaValue::plain_text)
    }

    /// Set `pagetitle` to `title` unless the document already has a `title`
    /// or `pagetitle`. Returns whether it was set.
    pub fn ensure_page_title(&mut self, title: &str) -> bool {
        if self.meta.contains_key("title") || self.meta.contains_key("pagetitle") {
            return false;
        }
        self.meta
            .insert("pagetitle".to_owned(), MetaValue::word(title));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {
                "panview_math": {"t": "MetaInlines", "c": [{"t": "Str", "c": "mathml"}]}
            },
            "blocks": [
                {"t": "Header", "c": [1, ["intro", [], []], [{"t": "Str", "c": "Intro"}]]},
                {"t": "Para", "c": [{"t": "Str", "c": "Hello"}]},
                {"t": "CodeBlock", "c": [["", ["dot"], []], "digraph { a -> b }"]}
            ]
        })
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let raw = sample();
        let doc = Document::from_json(raw.to_string().as_bytes()).unwrap();
        assert_eq!(doc.blocks.len(), 3);

        let out: Value = serde_json::from_slice(&doc.to_json().unwrap()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_meta_text() {
        let doc = Document::from_json(sample().to_string().as_bytes()).unwrap();
        assert_eq!(doc.meta_text("panview_math").as_deref(), Some("mathml"));
        assert_eq!(doc.meta_text("title"), None);
    }

    #[test]
    fn test_ensure_page_title_sets_when_untitled() {
        let mut doc = Document::from_json(sample().to_string().as_bytes()).unwrap();
        assert!(doc.ensure_page_title("intro"));
        assert_eq!(doc.meta_text("pagetitle").as_deref(), Some("intro"));
    }

    #[test]
    fn test_ensure_page_title_keeps_existing_title() {
        let mut raw = sample();
        raw["meta"]["title"] = json!({"t": "MetaInlines", "c": [{"t": "Str", "c": "Notes"}]});
        let mut doc = Document::from_json(raw.to_string().as_bytes()).unwrap();

        assert!(!doc.ensure_page_title("intro"));
        assert!(!doc.meta.contains_key("pagetitle"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Document::from_json(b"{\"blocks\": ").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
        let err = Document::from_json(b"[]").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}

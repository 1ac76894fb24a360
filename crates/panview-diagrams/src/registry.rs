//! Diagram format → renderer registry.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use panview_document::CodeBlock;
use panview_process::Tool;

/// Known diagram formats and the tools that render them.
#[derive(Debug, Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Tool>,
}

impl RendererRegistry {
    /// Build from `format → argv`, applying `timeout` to every renderer.
    ///
    /// Entries with an empty argv are skipped.
    #[must_use]
    pub fn new(renderers: &BTreeMap<String, Vec<String>>, timeout: Duration) -> Self {
        let renderers = renderers
            .iter()
            .filter_map(|(format, argv)| {
                let tool = Tool::from_argv(argv)?.timeout(timeout);
                Some((format.clone(), tool))
            })
            .collect();
        Self { renderers }
    }

    /// Registry with a single renderer.
    #[must_use]
    pub fn with(mut self, format: impl Into<String>, tool: Tool) -> Self {
        self.renderers.insert(format.into(), tool);
        self
    }

    /// Whether `format` has a renderer.
    #[must_use]
    pub fn is_known(&self, format: &str) -> bool {
        self.renderers.contains_key(format)
    }

    /// Renderer for `format`.
    #[must_use]
    pub fn get(&self, format: &str) -> Option<&Tool> {
        self.renderers.get(format)
    }

    /// The diagram format of a code block: its first class naming a known
    /// format.
    #[must_use]
    pub fn format_of<'a>(&self, code: &'a CodeBlock) -> Option<&'a str> {
        code.attr
            .classes
            .iter()
            .map(String::as_str)
            .find(|class| self.is_known(class))
    }
}

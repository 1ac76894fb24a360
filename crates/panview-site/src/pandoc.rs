//! Two-stage pandoc invocation.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use panview_process::Tool;

/// Metadata key selecting the math rendering mode.
pub const MATH_META_KEY: &str = "panview_math";

/// Pipeline stage a renderer failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Source → JSON.
    Parse,
    /// Parsing the JSON document.
    Decode,
    /// JSON → HTML.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parsing source",
            Self::Decode => "reading document structure",
            Self::Render => "rendering HTML",
        })
    }
}

/// A document-level renderer failure with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("pandoc failed while {stage}: {message}")]
pub struct RendererFailure {
    pub stage: Stage,
    /// Renderer stderr or the decoding error, verbatim.
    pub message: String,
}

/// How formulas are rendered in the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathMode {
    #[default]
    MathJax,
    MathMl,
    None,
}

impl MathMode {
    /// Mode named by a document's `panview_math` value. Absent or
    /// unrecognized values select MathJax.
    #[must_use]
    pub fn from_meta(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("mathjax") => Self::MathJax,
            Some("mathml") => Self::MathMl,
            Some("none") => Self::None,
            Some(other) => {
                tracing::warn!(value = other, "Unknown {MATH_META_KEY} value, using mathjax");
                Self::MathJax
            }
        }
    }

    /// Pandoc arguments for this mode.
    #[must_use]
    pub fn args(self, mathjax_url: &str) -> Vec<String> {
        match self {
            Self::MathJax => vec![format!("--mathjax={mathjax_url}")],
            Self::MathMl => vec!["--mathml".to_owned()],
            Self::None => Vec::new(),
        }
    }
}

/// Pandoc program settings shared by all variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocSettings {
    pub program: String,
    pub timeout: Duration,
    pub mathjax_url: String,
}

impl PandocSettings {
    /// Stage 1: `pandoc <options> -t json <source>`.
    pub(crate) fn parse_tool(&self, options: &[String], source: &Path) -> Tool {
        Tool::new(&self.program)
            .args(options.iter().cloned())
            .args(["-t", "json"])
            .arg(source.display().to_string())
            .timeout(self.timeout)
    }

    /// Stage 2: `pandoc <options> <math> -f json -t html`, document on stdin.
    pub(crate) fn render_tool(&self, options: &[String], math: MathMode) -> Tool {
        Tool::new(&self.program)
            .args(options.iter().cloned())
            .args(math.args(&self.mathjax_url))
            .args(["-f", "json", "-t", "html"])
            .timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings() -> PandocSettings {
        PandocSettings {
            program: "pandoc".to_owned(),
            timeout: Duration::from_secs(5),
            mathjax_url: "https://cdn.example/MathJax.js".to_owned(),
        }
    }

    #[test]
    fn test_math_mode_from_meta() {
        assert_eq!(MathMode::from_meta(None), MathMode::MathJax);
        assert_eq!(MathMode::from_meta(Some("mathjax")), MathMode::MathJax);
        assert_eq!(MathMode::from_meta(Some("mathml")), MathMode::MathMl);
        assert_eq!(MathMode::from_meta(Some("none")), MathMode::None);
        assert_eq!(MathMode::from_meta(Some("katex")), MathMode::MathJax);
    }

    #[test]
    fn test_math_args() {
        assert_eq!(
            MathMode::MathJax.args("https://cdn.example/MathJax.js"),
            vec!["--mathjax=https://cdn.example/MathJax.js".to_owned()]
        );
        assert_eq!(MathMode::MathMl.args("unused"), vec!["--mathml".to_owned()]);
        assert!(MathMode::None.args("unused").is_empty());
    }

    #[test]
    fn test_parse_tool_arguments() {
        let options = vec!["-s".to_owned(), "--toc".to_owned()];
        let tool = settings().parse_tool(&options, Path::new("/docs/notes/intro.md"));
        assert_eq!(tool.program(), "pandoc");
        assert_eq!(
            tool.arguments(),
            &["-s", "--toc", "-t", "json", "/docs/notes/intro.md"].map(str::to_owned)
        );
    }

    #[test]
    fn test_render_tool_arguments() {
        let tool = settings().render_tool(&[], MathMode::MathMl);
        assert_eq!(
            tool.arguments(),
            &["--mathml", "-f", "json", "-t", "html"].map(str::to_owned)
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = RendererFailure {
            stage: Stage::Parse,
            message: "unexpected end of input".to_owned(),
        };
        assert_eq!(
            failure.to_string(),
            "pandoc failed while parsing source: unexpected end of input"
        );
    }
}

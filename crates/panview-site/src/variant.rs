//! Format variants.

use std::fmt;

/// Rendering profile selected with `?fmt=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatVariant {
    /// Full page with top menu, table of contents and optional autorefresh.
    #[default]
    Standard,
    /// Full page without the menu, for saving or sharing.
    Export,
    /// Minimal standalone page without styling or table of contents.
    Simple,
    /// HTML fragment for embedding.
    Inline,
}

/// Fixed rendering options of a variant.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantOptions {
    /// Produce a complete HTML page (`-s`).
    pub standalone: bool,
    /// Include a table of contents (`--toc`).
    pub toc: bool,
    /// Page style and the markdown stylesheet link in the header.
    pub styled: bool,
    /// Top menu linking the other variants.
    pub menu: bool,
    /// Wrap the body in a `markdown-body` element.
    pub body_wrapper: bool,
    /// Eligible for the autorefresh script.
    pub autorefresh: bool,
}

impl FormatVariant {
    /// Every variant, in menu order.
    pub const ALL: [Self; 4] = [Self::Standard, Self::Export, Self::Simple, Self::Inline];

    /// Parse a `fmt` query value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "std" => Some(Self::Standard),
            "export" => Some(Self::Export),
            "simple" => Some(Self::Simple),
            "inline" => Some(Self::Inline),
            _ => None,
        }
    }

    /// Name used in query strings and artifact file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "std",
            Self::Export => "export",
            Self::Simple => "simple",
            Self::Inline => "inline",
        }
    }

    #[must_use]
    pub fn options(self) -> VariantOptions {
        match self {
            Self::Standard => VariantOptions {
                standalone: true,
                toc: true,
                styled: true,
                menu: true,
                body_wrapper: true,
                autorefresh: true,
            },
            Self::Export => VariantOptions {
                standalone: true,
                toc: true,
                styled: true,
                menu: false,
                body_wrapper: true,
                autorefresh: false,
            },
            Self::Simple => VariantOptions {
                standalone: true,
                toc: false,
                styled: false,
                menu: false,
                body_wrapper: false,
                autorefresh: false,
            },
            Self::Inline => VariantOptions {
                standalone: false,
                toc: false,
                styled: false,
                menu: false,
                body_wrapper: false,
                autorefresh: false,
            },
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Document compilation for panview.
//!
//! This crate turns a logical document name into cached HTML:
//!
//! 1. resolve the source through [`PathResolver`](panview_storage::PathResolver)
//! 2. reuse `<cache>/<name>.<variant>.html` if it is not older than the source
//! 3. otherwise run pandoc to JSON, rewrite diagram blocks and metadata,
//!    run pandoc to HTML and replace the artifact atomically
//!
//! [`AppContext`] owns the cache root and one [`DocumentCompiler`] per
//! [`FormatVariant`]; it is built once at startup and shared by `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use panview_site::{AppContext, FormatVariant};
//!
//! let context = AppContext::from_config(&config)?;
//! let artifact = context.compile("notes/intro", FormatVariant::Standard).await?;
//! let reload = context.is_stale("notes/intro", FormatVariant::Standard, Some(loaded_at))?;
//! ```

mod compiler;
mod context;
mod error;
mod includes;
mod pandoc;
mod staleness;
mod variant;

pub use compiler::{CompiledArtifact, DocumentCompiler};
pub use context::{AppContext, ContextError};
pub use error::CompileError;
pub use includes::{Includes, after_html, before_html, header_html, write_includes};
pub use pandoc::{MATH_META_KEY, MathMode, PandocSettings, RendererFailure, Stage};
pub use staleness::is_stale;
pub use variant::{FormatVariant, VariantOptions};

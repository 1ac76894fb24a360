//! Diagram rendering for panview.
//!
//! Code blocks tagged with a diagram format (`dot`, `plantuml`, or any format
//! configured in `[diagrams.renderers]`) are rendered by an external tool
//! before the final document is assembled:
//!
//! - [`DiagramKey`] digests the exact code text (SHA-256)
//! - [`RendererRegistry`] maps formats to tools
//! - [`DiagramCache`] stores images as `<digest>.<format>.png`, renders each
//!   digest at most once, and rewrites blocks to images or error displays
//!
//! # Example
//!
//! ```ignore
//! use panview_diagrams::{DiagramCache, RendererRegistry};
//!
//! let registry = RendererRegistry::new(&config.diagrams.renderers, config.diagrams.timeout());
//! let cache = DiagramCache::new(cache_root.join("generated"), registry)?;
//! cache.process_document(&mut document).await;
//! ```

mod cache;
mod key;
mod registry;

pub use cache::{DiagramCache, GENERATED_URL_PREFIX};
pub use key::DiagramKey;
pub use registry::RendererRegistry;

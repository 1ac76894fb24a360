//! Source resolution for panview.
//!
//! Maps logical document names (`notes/intro`) to files under a configured
//! root and guarantees that nothing resolves outside it:
//!
//! - [`PathResolver::resolve`] tries the literal name, then each source
//!   extension in priority order
//! - [`PathResolver::classify`] tells compilable sources from static assets
//! - [`PathResolver::contain`] maps any relative name into the root, failing
//!   with [`StorageErrorKind::PathViolation`] on escape whether or not the
//!   target exists
//!
//! The same resolver type guards the cache root, where compiled artifacts and
//! generated images live.
//!
//! # Example
//!
//! ```ignore
//! use panview_storage::{PathResolver, SourceKind};
//!
//! let resolver = PathResolver::new("docs".as_ref(), vec![".md".into(), ".rst".into()])?;
//! let source = resolver.resolve("notes/intro")?; // docs/notes/intro.md
//! assert_eq!(resolver.classify("notes/intro")?, SourceKind::Compilable);
//! assert!(resolver.resolve("../etc/passwd").unwrap_err().is_path_violation());
//! ```

mod error;
mod resolver;

pub use error::{StorageError, StorageErrorKind};
pub use resolver::{PathResolver, ResolvedSource, SourceKind, modified};

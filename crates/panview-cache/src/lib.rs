//! Cache primitives for panview.
//!
//! Both caches in panview (compiled documents and generated diagrams) are
//! plain files under one shared root directory. This crate provides the
//! pieces they have in common:
//!
//! - [`CacheRoot`]: the root directory, either process-scoped (temporary,
//!   removed on shutdown) or persistent (guarded by a `VERSION` file)
//! - [`write_atomic`] and [`write_atomic_with_mtime`]: replace a file
//!   wholesale so readers never observe a partial write
//! - [`SingleFlight`]: at most one in-flight computation per key, with late
//!   callers sharing the leader's result
//!
//! # Example
//!
//! ```ignore
//! use panview_cache::{CacheRoot, SingleFlight, write_atomic};
//!
//! let root = CacheRoot::temporary()?;
//! let flight: SingleFlight<String, bool> = SingleFlight::new();
//!
//! let ok = flight
//!     .run("notes/intro".to_owned(), || async {
//!         write_atomic(&root.path().join("notes/intro.std.html"), b"<p>hi</p>")
//!             .await
//!             .is_ok()
//!     })
//!     .await;
//! ```

mod atomic;
mod flight;
mod root;

pub use atomic::{write_atomic, write_atomic_with_mtime};
pub use flight::SingleFlight;
pub use root::CacheRoot;

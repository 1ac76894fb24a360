//! Typed pandoc document model.
//!
//! Pandoc's JSON AST is the intermediate form between the two rendering
//! stages. This crate types only what panview rewrites (paragraphs, code
//! blocks, metadata scalars) and keeps every other element as a
//! [`RawNode`], so a parse/serialize cycle leaves untouched content intact.

mod block;
mod document;
mod meta;
mod node;

pub use block::{Attr, Block, CodeBlock};
pub use document::{Document, DocumentError};
pub use meta::MetaValue;
pub use node::RawNode;

//! Content digest for diagram cache entries.

use sha2::{Digest, Sha256};

/// File extension of generated images.
pub(crate) const IMAGE_EXTENSION: &str = "png";

/// Identity of a rendered diagram: its code text and diagram format.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Code text exactly as it appears in the document.
    pub source: &'a str,
    /// Diagram format (`dot`, `plantuml`, ...).
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// SHA-256 of the code text, hex encoded.
    ///
    /// The format is not part of the digest; it is part of the file name.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        hex::encode(Sha256::digest(self.source.as_bytes()))
    }

    /// Image file name: `<digest>.<format>.png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}.{IMAGE_EXTENSION}",
            self.compute_hash(),
            self.format
        )
    }
}

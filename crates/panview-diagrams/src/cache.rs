//! Diagram cache: code blocks in, image blocks out.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use panview_cache::{SingleFlight, write_atomic};
use panview_document::{Block, Document};
use regex::Regex;

use crate::key::DiagramKey;
use crate::registry::RendererRegistry;

/// URL prefix under which generated images are served.
pub const GENERATED_URL_PREFIX: &str = "/generated";

static IMAGE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{64}\.[A-Za-z0-9_-]+\.png$").expect("invalid image name regex")
});

/// Outcome shared between concurrent renders of the same diagram.
type RenderOutcome = Result<(), String>;

/// Renders diagram code blocks to images stored by content digest.
///
/// Images live in one flat directory as `<digest>.<format>.png`. An existing
/// image is never re-rendered or overwritten; entries are never evicted.
pub struct DiagramCache {
    dir: PathBuf,
    registry: RendererRegistry,
    flight: SingleFlight<(String, String), RenderOutcome>,
}

impl DiagramCache {
    /// Create a cache storing images in `dir`, which is created if missing.
    pub fn new(dir: impl Into<PathBuf>, registry: RendererRegistry) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            registry,
            flight: SingleFlight::new(),
        })
    }

    /// Image directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `format` names a configured diagram renderer.
    #[must_use]
    pub fn is_known_format(&self, format: &str) -> bool {
        self.registry.is_known(format)
    }

    /// Path of a generated image requested by file name.
    ///
    /// `None` unless the name has the `<digest>.<format>.png` shape, which
    /// also rules out separators and parent segments.
    #[must_use]
    pub fn image_path(&self, file_name: &str) -> Option<PathBuf> {
        IMAGE_NAME_PATTERN
            .is_match(file_name)
            .then(|| self.dir.join(file_name))
    }

    /// Rewrite every top-level diagram block of `document`.
    ///
    /// Returns the number of blocks rewritten.
    pub async fn process_document(&self, document: &mut Document) -> usize {
        let mut rewritten = 0;
        for block in &mut document.blocks {
            if self.process(block).await {
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Rewrite `block` if it is a diagram code block.
    ///
    /// On success it becomes an image referencing the generated file; on
    /// failure it becomes an error display with the renderer's diagnostics.
    /// Other blocks are left alone. Returns whether `block` was rewritten.
    pub async fn process(&self, block: &mut Block) -> bool {
        let Some(code) = block.as_code_block() else {
            return false;
        };
        let Some(format) = self.registry.format_of(code) else {
            return false;
        };

        let key = DiagramKey {
            source: &code.text,
            format,
        };
        let replacement = match self.render(key).await {
            Ok(file_name) => Block::image(format!("{GENERATED_URL_PREFIX}/{file_name}")),
            Err(diagnostics) => Block::error_display(code, diagnostics),
        };
        *block = replacement;
        true
    }

    /// Ensure the image for `key` exists and return its file name.
    async fn render(&self, key: DiagramKey<'_>) -> Result<String, String> {
        let file_name = key.file_name();
        let path = self.dir.join(&file_name);
        let flight_key = (key.compute_hash(), key.format.to_owned());

        let outcome = self
            .flight
            .run(flight_key, || async {
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    tracing::debug!(file = %file_name, "Diagram cache hit");
                    return Ok(());
                }

                let tool = self
                    .registry
                    .get(key.format)
                    .ok_or_else(|| format!("No renderer for diagram format `{}`", key.format))?;

                tracing::debug!(file = %file_name, program = tool.program(), "Rendering diagram");
                let image = tool.run(key.source.as_bytes()).await.map_err(|e| {
                    tracing::warn!(format = key.format, error = %e, "Diagram rendering failed");
                    e.diagnostics()
                })?;

                write_atomic(&path, &image).await.map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to store diagram");
                    format!("Failed to store diagram image: {e}")
                })
            })
            .await;
        outcome.map(|()| file_name)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use panview_document::CodeBlock;
    use panview_process::Tool;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Renderer that echoes its input and appends one line to `log` per run.
    fn counting_cat(log: &Path) -> Tool {
        Tool::new("sh")
            .arg("-c")
            .arg(format!("echo run >> '{}'; cat", log.display()))
    }

    fn runs(log: &Path) -> usize {
        std::fs::read_to_string(log)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn fixture() -> (TempDir, PathBuf, DiagramCache) {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("runs.log");
        let registry = RendererRegistry::default()
            .with("dot", counting_cat(&log))
            .with(
                "plantuml",
                Tool::new("sh").arg("-c").arg("echo 'Syntax Error?' >&2; exit 1"),
            );
        let cache = DiagramCache::new(tmp.path().join("generated"), registry).unwrap();
        (tmp, log, cache)
    }

    fn dot_block(text: &str) -> Block {
        Block::CodeBlock(CodeBlock::new(&["dot"], text))
    }

    #[tokio::test]
    async fn test_success_rewrites_to_image() {
        let (_tmp, log, cache) = fixture();
        let mut block = dot_block("digraph { a -> b }");

        assert!(cache.process(&mut block).await);

        let file_name = DiagramKey {
            source: "digraph { a -> b }",
            format: "dot",
        }
        .file_name();
        assert_eq!(block, Block::image(format!("/generated/{file_name}")));
        assert_eq!(
            std::fs::read(cache.dir().join(&file_name)).unwrap(),
            b"digraph { a -> b }"
        );
        assert_eq!(runs(&log), 1);
    }

    #[tokio::test]
    async fn test_identical_code_renders_once() {
        let (_tmp, log, cache) = fixture();

        let mut first = dot_block("digraph { a -> b }");
        let mut second = dot_block("digraph { a -> b }");
        cache.process(&mut first).await;
        cache.process(&mut second).await;

        assert_eq!(first, second);
        assert_eq!(runs(&log), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_code_renders_once() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("runs.log");
        let slow = Tool::new("sh")
            .arg("-c")
            .arg(format!("echo run >> '{}'; sleep 0.2; cat", log.display()));
        let cache = Arc::new(
            DiagramCache::new(
                tmp.path().join("generated"),
                RendererRegistry::default().with("dot", slow),
            )
            .unwrap(),
        );

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let mut block = dot_block("digraph { x }");
                    cache.process(&mut block).await;
                    block
                })
            })
            .collect();

        for handle in handles {
            assert!(matches!(handle.await.unwrap(), Block::Image { .. }));
        }
        assert_eq!(runs(&log), 1);
    }

    #[tokio::test]
    async fn test_failure_rewrites_to_error_display() {
        let (_tmp, _log, cache) = fixture();
        let code = CodeBlock::new(&["plantuml"], "@startuml\nA ->\n");
        let mut block = Block::CodeBlock(code.clone());

        assert!(cache.process(&mut block).await);

        assert_eq!(block, Block::error_display(&code, "Syntax Error?\n"));
        assert_eq!(std::fs::read_dir(cache.dir()).unwrap().count(), 0);
        // The rewritten block no longer carries a diagram class
        assert!(!cache.process(&mut block).await);
    }

    #[tokio::test]
    async fn test_failure_keeps_block_identifier() {
        let (_tmp, _log, cache) = fixture();
        let mut code = CodeBlock::new(&["plantuml"], "A ->");
        code.attr.id = "flow".to_owned();
        code.attr.attributes = vec![("caption".to_owned(), "Flow".to_owned())];
        let mut block = Block::CodeBlock(code);

        cache.process(&mut block).await;

        let Block::ErrorDisplay { attr, .. } = block else {
            panic!("expected error display, got {block:?}");
        };
        assert_eq!(attr.id, "flow");
        assert!(attr.classes.is_empty());
        assert_eq!(attr.attributes, vec![("caption".to_owned(), "Flow".to_owned())]);
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let tmp = TempDir::new().unwrap();
        let hang = Tool::new("sh")
            .arg("-c")
            .arg("sleep 10")
            .timeout(Duration::from_millis(100));
        let cache = DiagramCache::new(
            tmp.path().join("generated"),
            RendererRegistry::default().with("dot", hang),
        )
        .unwrap();

        let mut block = dot_block("digraph {}");
        cache.process(&mut block).await;

        assert!(matches!(block, Block::ErrorDisplay { ref message, .. } if message.contains("did not finish")));
    }

    #[tokio::test]
    async fn test_non_diagram_blocks_untouched() {
        let (_tmp, log, cache) = fixture();
        let mut code = Block::CodeBlock(CodeBlock::new(&["python"], "print()"));
        let original = code.clone();

        assert!(!cache.process(&mut code).await);
        assert_eq!(code, original);
        assert_eq!(runs(&log), 0);
    }

    #[tokio::test]
    async fn test_process_document_counts_rewrites() {
        let (_tmp, _log, cache) = fixture();
        let mut document = Document {
            api_version: Vec::new(),
            meta: std::collections::BTreeMap::new(),
            blocks: vec![
                Block::Paragraph(Vec::new()),
                dot_block("digraph { a }"),
                Block::CodeBlock(CodeBlock::new(&["plantuml"], "A")),
            ],
        };

        assert_eq!(cache.process_document(&mut document).await, 2);
        assert!(matches!(document.blocks[0], Block::Paragraph(_)));
        assert!(matches!(document.blocks[1], Block::Image { .. }));
        assert!(matches!(document.blocks[2], Block::ErrorDisplay { .. }));
    }

    #[test]
    fn test_image_path_validation() {
        let (_tmp, _log, cache) = fixture();
        let digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

        assert_eq!(
            cache.image_path(&format!("{digest}.dot.png")),
            Some(cache.dir().join(format!("{digest}.dot.png")))
        );
        assert_eq!(cache.image_path("../secret.dot.png"), None);
        assert_eq!(cache.image_path(&format!("{digest}.dot.svg")), None);
        assert_eq!(cache.image_path("abc.dot.png"), None);
    }
}

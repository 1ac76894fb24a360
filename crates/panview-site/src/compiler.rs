//! Document compiler: source → cached HTML artifact.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use panview_cache::{SingleFlight, write_atomic_with_mtime};
use panview_diagrams::DiagramCache;
use panview_document::Document;
use panview_storage::{PathResolver, ResolvedSource, modified};

use crate::error::CompileError;
use crate::includes::Includes;
use crate::pandoc::{MATH_META_KEY, MathMode, PandocSettings, RendererFailure, Stage};
use crate::variant::FormatVariant;

/// A compiled document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub path: PathBuf,
    /// Equal to the source's mtime when it was compiled.
    pub modified: SystemTime,
    /// The HTML as of this compile. Serve this rather than re-reading
    /// `path`, which a later failed compile may remove.
    pub html: Arc<[u8]>,
}

type CompileOutcome = Result<CompiledArtifact, CompileError>;

/// Compiles documents for one format variant.
pub struct DocumentCompiler {
    variant: FormatVariant,
    options: Vec<String>,
    sources: Arc<PathResolver>,
    output: Arc<PathResolver>,
    diagrams: Arc<DiagramCache>,
    pandoc: PandocSettings,
    flight: SingleFlight<String, CompileOutcome>,
}

impl DocumentCompiler {
    pub fn new(
        variant: FormatVariant,
        includes: &Includes,
        sources: Arc<PathResolver>,
        output: Arc<PathResolver>,
        diagrams: Arc<DiagramCache>,
        pandoc: PandocSettings,
    ) -> Self {
        let variant_options = variant.options();
        let mut options = Vec::new();
        if variant_options.standalone {
            options.push("-s".to_owned());
            options.extend(includes.args());
            if variant_options.toc {
                options.push("--toc".to_owned());
            }
        }

        Self {
            variant,
            options,
            sources,
            output,
            diagrams,
            pandoc,
            flight: SingleFlight::new(),
        }
    }

    #[must_use]
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Pandoc options fixed by the variant.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Output path for `name`: `<output root>/<name>.<variant>.html`.
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf, CompileError> {
        let file = format!("{name}.{}.html", self.variant);
        self.output
            .contain(&file)
            .map_err(|e| CompileError::from_storage(&e, name))
    }

    /// Compile `name`, reusing the cached artifact while it is current.
    ///
    /// Concurrent calls for the same name share one pipeline run.
    pub async fn compile(&self, name: &str) -> CompileOutcome {
        let artifact_path = self.artifact_path(name)?;
        // Fail fast without entering the flight for unknown names.
        self.resolve(name)?;

        self.flight
            .run(name.to_owned(), || self.compile_locked(name, &artifact_path))
            .await
    }

    fn resolve(&self, name: &str) -> Result<ResolvedSource, CompileError> {
        self.sources
            .resolve(name)
            .map_err(|e| CompileError::from_storage(&e, name))
    }

    async fn compile_locked(&self, name: &str, artifact_path: &Path) -> CompileOutcome {
        let source = self.resolve(name)?;

        if let Some(artifact_modified) = modified(artifact_path)?
            && artifact_modified >= source.modified
        {
            tracing::debug!(name, variant = %self.variant, "Artifact cache hit");
            let html = tokio::fs::read(artifact_path).await?;
            return Ok(CompiledArtifact {
                path: artifact_path.to_path_buf(),
                modified: artifact_modified,
                html: Arc::from(html),
            });
        }

        tracing::info!(name, variant = %self.variant, source = %source.path.display(), "Compiling document");
        match self.run_pipeline(name, &source).await {
            Ok(html) => {
                // Stamped with the mtime seen before stage 1, so an edit saved
                // during the run still makes the artifact stale.
                write_atomic_with_mtime(artifact_path, &html, source.modified).await?;
                Ok(CompiledArtifact {
                    path: artifact_path.to_path_buf(),
                    modified: source.modified,
                    html: Arc::from(html),
                })
            }
            Err(failure) => {
                tracing::warn!(name, variant = %self.variant, error = %failure, "Compilation failed");
                remove_stale(artifact_path).await?;
                Err(failure.into())
            }
        }
    }

    /// Run both pandoc stages with the document rewrite in between.
    async fn run_pipeline(
        &self,
        name: &str,
        source: &ResolvedSource,
    ) -> Result<Vec<u8>, RendererFailure> {
        let json = self
            .pandoc
            .parse_tool(&self.options, &source.path)
            .run(&[])
            .await
            .map_err(|e| RendererFailure {
                stage: Stage::Parse,
                message: e.diagnostics(),
            })?;

        let mut document = Document::from_json(&json).map_err(|e| RendererFailure {
            stage: Stage::Decode,
            message: e.to_string(),
        })?;

        let diagrams = self.diagrams.process_document(&mut document).await;
        if diagrams > 0 {
            tracing::debug!(name, diagrams, "Rewrote diagram blocks");
        }

        document.ensure_page_title(base_name(name));
        let math = MathMode::from_meta(document.meta_text(MATH_META_KEY).as_deref());

        let json = document.to_json().map_err(|e| RendererFailure {
            stage: Stage::Decode,
            message: e.to_string(),
        })?;

        self.pandoc
            .render_tool(&self.options, math)
            .run(&json)
            .await
            .map_err(|e| RendererFailure {
                stage: Stage::Render,
                message: e.diagnostics(),
            })
    }
}

/// Last segment of a logical name.
fn base_name(name: &str) -> &str {
    name.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(name)
}

async fn remove_stale(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed stale artifact");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("notes/intro"), "intro");
        assert_eq!(base_name("intro"), "intro");
        assert_eq!(base_name("a/b/c.md"), "c.md");
    }
}

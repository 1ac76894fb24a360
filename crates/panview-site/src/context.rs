//! Application context: everything a request needs, built once at startup.

use std::io;
use std::sync::Arc;

use panview_cache::CacheRoot;
use panview_config::Config;
use panview_diagrams::{DiagramCache, RendererRegistry};
use panview_storage::{PathResolver, SourceKind, StorageError};
use sha2::{Digest, Sha256};

use crate::compiler::{CompiledArtifact, DocumentCompiler};
use crate::error::CompileError;
use crate::includes::write_includes;
use crate::pandoc::PandocSettings;
use crate::staleness;
use crate::variant::FormatVariant;

/// Cache format version; bump when the artifact layout changes.
const CACHE_VERSION: &str = concat!("panview-", env!("CARGO_PKG_VERSION"));

/// Version stored in a persistent cache root: the build plus a fingerprint
/// of every setting that ends up in compiled pages or generated images.
///
/// Artifacts are only checked against their source's mtime, so a change to
/// any of these settings must wipe the cache instead.
fn cache_version(config: &Config) -> String {
    let mut hasher = Sha256::new();
    let mut field = |value: &str| {
        hasher.update(value.as_bytes());
        hasher.update(b"\0");
    };
    field(&config.pandoc.program);
    field(&config.pandoc.mathjax_url);
    field(if config.live_reload.enabled { "autorefresh" } else { "" });
    for (format, argv) in &config.diagrams.renderers {
        field(format);
        for arg in argv {
            field(arg);
        }
    }
    let fingerprint = hex::encode(hasher.finalize());
    format!("{CACHE_VERSION}+{}", &fingerprint[..16])
}

/// Error building the application context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The source root cannot be opened.
    #[error("Cannot open document root: {0}")]
    Storage(#[from] StorageError),
    /// The cache root cannot be prepared.
    #[error("Cannot prepare cache directory: {0}")]
    Io(#[from] io::Error),
}

/// Shared state for serving documents: cache root, resolvers, diagram cache
/// and one compiler per format variant.
pub struct AppContext {
    cache_root: CacheRoot,
    sources: Arc<PathResolver>,
    output: Arc<PathResolver>,
    diagrams: Arc<DiagramCache>,
    compilers: Vec<DocumentCompiler>,
}

impl AppContext {
    /// Build the context: open the cache root, write include files and
    /// set up the compilers.
    pub fn from_config(config: &Config) -> Result<Self, ContextError> {
        let cache_root = match &config.cache_resolved.dir {
            Some(dir) => CacheRoot::persistent(dir, &cache_version(config))?,
            None => CacheRoot::temporary()?,
        };
        tracing::debug!(
            path = %cache_root.path().display(),
            temporary = cache_root.is_temporary(),
            "Cache root ready"
        );

        let sources = Arc::new(PathResolver::new(
            &config.docs_resolved.source_dir,
            config.docs_resolved.extensions.clone(),
        )?);
        let output = Arc::new(PathResolver::new(cache_root.path(), Vec::new())?);

        let registry =
            RendererRegistry::new(&config.diagrams.renderers, config.diagrams.timeout());
        let diagrams = Arc::new(DiagramCache::new(
            cache_root.path().join("generated"),
            registry,
        )?);

        let pandoc = PandocSettings {
            program: config.pandoc.program.clone(),
            timeout: config.pandoc.timeout(),
            mathjax_url: config.pandoc.mathjax_url.clone(),
        };

        let includes_dir = cache_root.path().join("includes");
        let compilers = FormatVariant::ALL
            .into_iter()
            .map(|variant| {
                let includes =
                    write_includes(&includes_dir, variant, config.live_reload.enabled)?;
                Ok(DocumentCompiler::new(
                    variant,
                    &includes,
                    Arc::clone(&sources),
                    Arc::clone(&output),
                    Arc::clone(&diagrams),
                    pandoc.clone(),
                ))
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            cache_root,
            sources,
            output,
            diagrams,
            compilers,
        })
    }

    /// Source resolver.
    #[must_use]
    pub fn sources(&self) -> &PathResolver {
        &self.sources
    }

    /// Resolver for the cache root.
    #[must_use]
    pub fn output(&self) -> &PathResolver {
        &self.output
    }

    #[must_use]
    pub fn diagrams(&self) -> &DiagramCache {
        &self.diagrams
    }

    /// Cache root directory.
    #[must_use]
    pub fn cache_root(&self) -> &CacheRoot {
        &self.cache_root
    }

    /// Compiler for `variant`.
    #[must_use]
    pub fn compiler(&self, variant: FormatVariant) -> &DocumentCompiler {
        // One compiler per variant, in `FormatVariant::ALL` order.
        let index = FormatVariant::ALL
            .iter()
            .position(|v| *v == variant)
            .unwrap_or_default();
        &self.compilers[index]
    }

    /// Whether `name` is compiled or served as a static asset.
    pub fn classify(&self, name: &str) -> Result<SourceKind, StorageError> {
        self.sources.classify(name)
    }

    /// Compile `name` in `variant`.
    pub async fn compile(
        &self,
        name: &str,
        variant: FormatVariant,
    ) -> Result<CompiledArtifact, CompileError> {
        self.compiler(variant).compile(name).await
    }

    /// Whether the page for `name` should be reloaded.
    pub fn is_stale(
        &self,
        name: &str,
        variant: FormatVariant,
        since: Option<u64>,
    ) -> Result<bool, CompileError> {
        let artifact = self.compiler(variant).artifact_path(name)?;
        staleness::is_stale(&self.sources, name, &artifact, since)
            .map_err(|e| CompileError::from_storage(&e, name))
    }

    /// Tear down the context, removing a temporary cache root.
    pub fn close(self) -> io::Result<()> {
        self.cache_root.close()
    }
}

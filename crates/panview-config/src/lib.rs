//! Configuration management for panview.
//!
//! Parses `panview.toml` with serde and discovers it in the current directory
//! or any parent. CLI flags are layered on top via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in:
//! - `server.host`
//! - `pandoc.program`
//! - `pandoc.mathjax_url`
//! - the program (first element) of each `diagrams.renderers` entry

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "panview.toml";

/// Default MathJax bundle injected for client-side formula rendering.
pub const DEFAULT_MATHJAX_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.7/MathJax.js?config=TeX-AMS-MML_HTMLorMML";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override document root.
    pub source_dir: Option<PathBuf>,
    /// Override persistent cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override pandoc executable.
    pub pandoc_program: Option<String>,
    /// Override the autorefresh script toggle.
    pub live_reload_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Document root configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Pandoc invocation settings.
    pub pandoc: PandocConfig,
    /// Diagram renderer registry.
    pub diagrams: DiagramsConfig,
    /// Autorefresh settings.
    pub live_reload: LiveReloadConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
}

/// Resolved document root configuration.
#[derive(Debug)]
pub struct DocsConfig {
    /// Directory documents are served from.
    pub source_dir: PathBuf,
    /// Source extensions in priority order (with leading dot).
    pub extensions: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![".md".to_owned(), ".rst".to_owned()]
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    dir: Option<String>,
}

/// Resolved cache configuration.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Persistent cache directory. `None` uses a temporary directory that is
    /// removed on shutdown.
    pub dir: Option<PathBuf>,
}

/// Pandoc invocation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PandocConfig {
    /// Executable name or path.
    pub program: String,
    /// Upper bound for a single pandoc run, in seconds.
    pub timeout_secs: u64,
    /// Script URL passed to `--mathjax`.
    pub mathjax_url: String,
}

impl PandocConfig {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_owned(),
            timeout_secs: 30,
            mathjax_url: DEFAULT_MATHJAX_URL.to_owned(),
        }
    }
}

/// Diagram renderer registry.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Upper bound for a single renderer run, in seconds.
    pub timeout_secs: u64,
    /// Diagram language → argument vector. Replaces the defaults when present.
    pub renderers: BTreeMap<String, Vec<String>>,
}

impl DiagramsConfig {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        let renderers = [
            ("dot", vec!["dot", "-Tpng"]),
            ("plantuml", vec!["plantuml", "-pipe"]),
        ]
        .into_iter()
        .map(|(name, argv)| {
            (
                name.to_owned(),
                argv.into_iter().map(str::to_owned).collect(),
            )
        })
        .collect();

        Self {
            timeout_secs: 30,
            renderers,
        }
    }
}

/// Autorefresh configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Inject the polling script into the standard format.
    pub enabled: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`pandoc.program`").
        field: String,
        /// Error message (e.g., "${`PANDOC`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `panview.toml` in the current directory and its parents, falling
    /// back to defaults rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache_resolved.dir = Some(cache_dir.clone());
        }
        if let Some(program) = &settings.pandoc_program {
            self.pandoc.program.clone_from(program);
        }
        if let Some(enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = enabled;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            pandoc: PandocConfig::default(),
            diagrams: DiagramsConfig::default(),
            live_reload: LiveReloadConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.to_path_buf(),
                extensions: default_extensions(),
            },
            cache_resolved: CacheConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_docs()?;
        self.validate_pandoc()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        if self.docs_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions cannot be empty".to_owned(),
            ));
        }
        for ext in &self.docs_resolved.extensions {
            if ext.len() < 2 || !ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "docs.extensions entry '{ext}' must look like '.md'"
                )));
            }
        }
        Ok(())
    }

    fn validate_pandoc(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.pandoc.program, "pandoc.program")?;
        require_positive(self.pandoc.timeout_secs, "pandoc.timeout_secs")?;
        require_non_empty(&self.pandoc.mathjax_url, "pandoc.mathjax_url")?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        require_positive(self.diagrams.timeout_secs, "diagrams.timeout_secs")?;

        for (name, argv) in &self.diagrams.renderers {
            // The name ends up in generated file names and URLs.
            let valid_name = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid_name {
                return Err(ConfigError::Validation(format!(
                    "diagrams.renderers key '{name}' may only contain letters, digits, '-' and '_'"
                )));
            }
            if argv.first().is_none_or(String::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "diagrams.renderers.{name} must name a program"
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.pandoc.program = expand::expand_env(&self.pandoc.program, "pandoc.program")?;
        self.pandoc.mathjax_url =
            expand::expand_env(&self.pandoc.mathjax_url, "pandoc.mathjax_url")?;

        for (name, argv) in &mut self.diagrams.renderers {
            if let Some(program) = argv.first_mut() {
                *program = expand::expand_env(program, &format!("diagrams.renderers.{name}"))?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths against the directory holding the config file.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or(".")),
            extensions: self
                .docs
                .extensions
                .clone()
                .unwrap_or_else(default_extensions),
        };
        self.cache_resolved = CacheConfig {
            dir: self.cache.dir.as_deref().map(|dir| config_dir.join(dir)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/work"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/work"));
        assert_eq!(config.docs_resolved.extensions, vec![".md", ".rst"]);
        assert!(config.cache_resolved.dir.is_none());
        assert_eq!(config.pandoc.program, "pandoc");
        assert_eq!(config.pandoc.timeout(), Duration::from_secs(30));
        assert_eq!(config.pandoc.mathjax_url, DEFAULT_MATHJAX_URL);
        assert!(!config.live_reload.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_renderers() {
        let config = DiagramsConfig::default();
        assert_eq!(config.renderers["dot"], vec!["dot", "-Tpng"]);
        assert_eq!(config.renderers["plantuml"], vec!["plantuml", "-pipe"]);
        assert_eq!(config.renderers.len(), 2);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.diagrams.renderers.len(), 2);
    }

    #[test]
    fn test_renderers_table_replaces_defaults() {
        let toml = r#"
[diagrams]
timeout_secs = 5

[diagrams.renderers]
mermaid = ["mmdc", "-i", "-", "-o", "-", "-e", "png"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.diagrams.timeout(), Duration::from_secs(5));
        assert_eq!(config.diagrams.renderers.len(), 1);
        assert_eq!(config.diagrams.renderers["mermaid"][0], "mmdc");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "notes"
extensions = [".md"]

[cache]
dir = ".panview/cache"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/notes")
        );
        assert_eq!(config.docs_resolved.extensions, vec![".md"]);
        assert_eq!(
            config.cache_resolved.dir,
            Some(PathBuf::from("/project/.panview/cache"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[server]
port = 9000

[pandoc]
program = "/usr/local/bin/pandoc"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pandoc.program, "/usr/local/bin/pandoc");
        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("."));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/panview.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_bad_extension() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.docs_resolved.extensions = vec!["md".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.extensions"));
    }

    #[test]
    fn test_validate_rejects_renderer_name_with_path_characters() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config
            .diagrams
            .renderers
            .insert("../dot".to_owned(), vec!["dot".to_owned()]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("../dot"));
    }

    #[test]
    fn test_validate_rejects_empty_renderer_argv() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.diagrams.renderers.insert("dot".to_owned(), Vec::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("diagrams.renderers.dot"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.pandoc.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pandoc.timeout_secs"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/work"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9001),
            source_dir: Some(PathBuf::from("/docs")),
            cache_dir: Some(PathBuf::from("/var/cache/panview")),
            pandoc_program: Some("pandoc-3".to_owned()),
            live_reload_enabled: Some(true),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/docs"));
        assert_eq!(
            config.cache_resolved.dir,
            Some(PathBuf::from("/var/cache/panview"))
        );
        assert_eq!(config.pandoc.program, "pandoc-3");
        assert!(config.live_reload.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.live_reload.enabled);
    }

    #[test]
    fn test_expand_env_vars_renderer_program() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("PANVIEW_TEST_GRAPHVIZ", "/opt/graphviz/bin");
        }
        let toml = r#"
[diagrams.renderers]
dot = ["${PANVIEW_TEST_GRAPHVIZ}/dot", "-Tpng"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(
            config.diagrams.renderers["dot"],
            vec!["/opt/graphviz/bin/dot", "-Tpng"]
        );
        unsafe {
            std::env::remove_var("PANVIEW_TEST_GRAPHVIZ");
        }
    }
}

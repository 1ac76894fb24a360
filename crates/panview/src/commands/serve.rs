//! `panview serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use panview_config::{CliSettings, Config};
use panview_server::{run_server, server_config_from_config};
use panview_site::AppContext;

use crate::error::CliError;
use crate::output::Output;

/// Host bound by `--remote`.
const REMOTE_HOST: &str = "0.0.0.0";

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Document root (overrides config).
    path: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover panview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, conflicts_with = "remote")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Inject the autorefresh script into standard pages.
    #[arg(short, long)]
    autorefresh: bool,

    /// Listen on all interfaces instead of localhost.
    #[arg(short, long)]
    remote: bool,

    /// Pandoc executable (overrides config).
    #[arg(long, env = "PANVIEW_PANDOC")]
    pandoc: Option<String>,

    /// Persistent cache directory (default: temporary, removed on exit).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Enable verbose output (compile and cache logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        if let Some(path) = &self.path
            && !path.is_dir()
        {
            return Err(CliError::Validation(format!(
                "Document root is not a directory: {}",
                path.display()
            )));
        }

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Configuration loaded");
        let context = AppContext::from_config(&config)?;

        output.highlight(&format!("panview {version}"));
        output.info(&format!(
            "Serving http://{}:{}/view/",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Document root: {}",
            config.docs_resolved.source_dir.display()
        ));
        if context.cache_root().is_temporary() {
            output.info("Cache directory: temporary");
        } else {
            output.info(&format!(
                "Cache directory: {}",
                context.cache_root().path().display()
            ));
        }
        output.info(&format!("Pandoc: {}", config.pandoc.program));
        if config.live_reload.enabled {
            output.info("Autorefresh: enabled");
        }
        if config.server.host == REMOTE_HOST {
            output.warning("Listening on all interfaces; documents are reachable from the network");
        }

        run_server(server_config_from_config(&config), context)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// CLI overrides layered on top of the config file.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: if self.remote {
                Some(REMOTE_HOST.to_owned())
            } else {
                self.host.clone()
            },
            port: self.port,
            source_dir: self.path.clone(),
            cache_dir: self.cache_dir.clone(),
            pandoc_program: self.pandoc.clone(),
            live_reload_enabled: self.autorefresh.then_some(true),
        }
    }
}

//! Application context: unified state passed to every command handler.

use std::path::PathBuf;

use crate::application::ports::ConfirmationGate;
use crate::domain::{ConfigError, DiscoveryConfig, DiscoveryError, RunConfig};
use crate::infra::config::YamlConfigStore;
use crate::infra::gate::{self, gate_for};
use crate::infra::logging::{self, LogSink};
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Stop running tasks without asking (also set by `CI` / `DISCOVERY_FORCE`).
    pub force: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Configuration file location.
    pub config: YamlConfigStore,
    /// When `true`, disruptive actions are approved without prompting.
    ///
    /// Set when `--force` / `-f` is passed, or when the `CI` or
    /// `DISCOVERY_FORCE` environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("DISCOVERY_FORCE").is_ok();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config: YamlConfigStore::new(flags.behaviour.config.as_deref()),
            non_interactive: flags.behaviour.force || ci_env,
        }
    }

    /// Gate deciding whether a running task may be stopped. Fixed for the run.
    ///
    /// Without `--force` an operator must be able to answer on the terminal;
    /// otherwise every stop request fails instead of prompting.
    #[must_use]
    pub fn gate(&self) -> Box<dyn ConfirmationGate> {
        gate_for(self.non_interactive, gate::attended())
    }

    /// Load the configuration file and start the log sink.
    ///
    /// The log sink is started even when the file is invalid so the failure
    /// is recorded. Call this before opening the flow span, then pass the
    /// result to [`AppContext::resolve`] inside it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or not valid YAML.
    pub fn load_config(&self) -> Result<DiscoveryConfig, ConfigError> {
        let loaded = self.config.load();
        let log_file = loaded
            .as_ref()
            .map_or_else(|_| DiscoveryConfig::default().log_file(), DiscoveryConfig::log_file);
        if let LogSink::Stderr { reason } = logging::init(&log_file) {
            self.output.warn(&format!("{reason}; logging to stderr"));
        }
        loaded
    }

    /// Resolve the settings of this run from a loaded file.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] if the file is unreadable or invalid.
    pub fn resolve(
        &self,
        loaded: Result<DiscoveryConfig, ConfigError>,
        view_override: Option<&str>,
    ) -> Result<RunConfig, DiscoveryError> {
        let resolved = loaded.and_then(|cfg| cfg.resolve(view_override, self.non_interactive));
        match resolved {
            Ok(run) => {
                tracing::info!(config = %self.config.path().display(), ?run, "configuration loaded");
                Ok(run)
            }
            Err(e) => {
                tracing::error!(config = %self.config.path().display(), error = %e, "invalid configuration");
                Err(e.into())
            }
        }
    }
}

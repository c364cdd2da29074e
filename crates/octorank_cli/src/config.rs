//! Configuration file support for octorank.
//!
//! Configuration is loaded with the following precedence (highest to
//! lowest):
//! 1. Environment variables (prefixed with `OCTORANK_`, e.g.
//!    `OCTORANK_DATABASE_URL`)
//! 2. Local config file (./octorank.toml)
//! 3. XDG config file (~/.config/octorank/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/octorank/octorank.db"
//!
//! [github]
//! token = "ghp_..."  # or use OCTORANK_GITHUB_TOKEN
//!
//! [notify]
//! webhook_url = "https://hooks.slack.com/services/..."
//!
//! [update]
//! concurrency = 10
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    pub notify: NotifyConfig,
    pub update: UpdateConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL. Defaults to a SQLite file in the XDG state
    /// directory when unset.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API token. Can also be set via OCTORANK_GITHUB_TOKEN.
    pub token: Option<String>,
}

/// Notification configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webhook URL for lifecycle notifications; notifications are disabled
    /// when unset.
    pub webhook_url: Option<String>,
}

/// Update pipeline tunables.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Maximum concurrent per-repository fetch tasks.
    pub concurrency: usize,
    /// Proactive request pacing in requests per second (0 disables).
    pub requests_per_second: u32,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            requests_per_second: octorank::gate::GITHUB_DEFAULT_RPS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "octorank") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("octorank.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./octorank.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("OCTORANK")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// The database URL, falling back to the default state directory path.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("octorank.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Default state directory (`~/.local/state/octorank` on Linux).
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "octorank").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

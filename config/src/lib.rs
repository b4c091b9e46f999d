//! Configuration loading for the playground client.
//!
//! The file lives at `~/.playground/config.toml` and every section is
//! optional:
//!
//! ```toml
//! [server]
//! base_url = "https://play.rust-lang.org/"
//! timeout_secs = 60
//!
//! [defaults]
//! channel = "nightly"
//! mode = "release"
//! edition = "2018"
//! backtrace = true
//! primary_action = "auto"
//!
//! [assembly]
//! flavor = "intel"
//! demangle = false
//! process = "raw"
//! ```
//!
//! `PLAYGROUND_BASE_URL` overrides `server.base_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use playground_types::{
    AssemblyFlavor, AssemblyOptions, Backtrace, Channel, Configuration, DemangleAssembly, Edition,
    Mode, ParseEnumError, PrimaryAction, ProcessAssembly,
};

pub const BASE_URL_ENV: &str = "PLAYGROUND_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://play.rust-lang.org/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid base URL {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidBaseUrl { .. } | ConfigError::InvalidValue(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaygroundConfig {
    pub server: Option<ServerConfig>,
    pub defaults: Option<DefaultsConfig>,
    pub assembly: Option<AssemblyConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    /// Whole-request timeout. Default: 60.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefaultsConfig {
    pub channel: Option<Channel>,
    pub mode: Option<Mode>,
    pub edition: Option<Edition>,
    #[serde(default)]
    pub backtrace: bool,
    /// `auto` or an action name such as `execute` or `mir`.
    pub primary_action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssemblyConfig {
    pub flavor: Option<AssemblyFlavor>,
    pub demangle: Option<bool>,
    pub process: Option<ProcessAssembly>,
}

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

/// A fully resolved configuration with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub configuration: Configuration,
}

impl PlaygroundConfig {
    /// Loads `~/.playground/config.toml`. A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Resolves against the process environment.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        self.resolve_with_base_override(std::env::var(BASE_URL_ENV).ok())
    }

    /// Resolves with an explicit base URL override in place of the environment.
    pub fn resolve_with_base_override(
        &self,
        base_override: Option<String>,
    ) -> Result<Settings, ConfigError> {
        let server = self.server.as_ref();
        let raw_base = base_override
            .filter(|value| !value.trim().is_empty())
            .or_else(|| server.and_then(|s| s.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_base).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw_base.clone(),
            source,
        })?;
        let timeout = Duration::from_secs(
            server
                .and_then(|s| s.timeout_secs)
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let mut configuration = Configuration::default();
        if let Some(defaults) = &self.defaults {
            configuration.channel = defaults.channel.unwrap_or_default();
            configuration.mode = defaults.mode.unwrap_or_default();
            configuration.edition = defaults.edition.unwrap_or_default();
            if defaults.backtrace {
                configuration.backtrace = Backtrace::Enabled;
            }
            if let Some(primary) = &defaults.primary_action {
                configuration.primary_action = primary.parse::<PrimaryAction>()?;
            }
        }
        if let Some(assembly) = &self.assembly {
            configuration.assembly = AssemblyOptions {
                flavor: assembly.flavor.unwrap_or_default(),
                demangle: match assembly.demangle {
                    Some(false) => DemangleAssembly::Mangle,
                    Some(true) | None => DemangleAssembly::Demangle,
                },
                process: assembly.process.unwrap_or_default(),
            };
        }

        Ok(Settings {
            server: ServerSettings { base_url, timeout },
            configuration,
        })
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".playground").join("config.toml"))
}

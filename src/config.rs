//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (a single `local` context)
//! 2. Config file: `--config <file>` or `$XDG_CONFIG_HOME/meshconn/config.toml`
//! 3. Environment variables: `MESHCONN_*` prefix
//! 4. `--context <name>` on the command line

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};

pub const DEFAULT_CONTEXT: &str = "local";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One named target platform deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextConfig {
    /// Base URL of the platform server, e.g. `http://localhost:9081`
    pub endpoint: String,
    /// Where the platform runs (docker, kubernetes, ...)
    pub platform: String,
    /// File holding the API token (supports `~` and `$VAR`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            platform: "docker".into(),
            token_file: None,
        }
    }
}

/// Raw context for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawContextConfig {
    pub endpoint: Option<String>,
    pub platform: Option<String>,
    pub token_file: Option<PathBuf>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub current_context: Option<String>,
    pub timeout_secs: Option<u64>,
    pub contexts: BTreeMap<String, RawContextConfig>,
}

impl ContextConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawContextConfig) -> Self {
        Self {
            endpoint: overlay
                .endpoint
                .clone()
                .unwrap_or_else(|| self.endpoint.clone()),
            platform: overlay
                .platform
                .clone()
                .unwrap_or_else(|| self.platform.clone()),
            token_file: overlay
                .token_file
                .clone()
                .or_else(|| self.token_file.clone()),
        }
    }
}

/// `MESHCONN_*` environment overrides.
///
/// `endpoint` and `token_file` apply to the selected context only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub current_context: Option<String>,
    pub timeout_secs: Option<u64>,
    pub endpoint: Option<String>,
    pub token_file: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> ApplicationResult<Self> {
        Self::from_source(None)
    }

    /// Read overrides from an explicit variable map instead of the process environment.
    pub fn from_source(source: Option<config::Map<String, String>>) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MESHCONN").source(source))
            .build()
            .map_err(config_err)?;

        let timeout_secs = match config.get::<u64>("timeout_secs") {
            Ok(val) => Some(val),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(config_err(e)),
        };

        Ok(Self {
            current_context: config.get_string("current_context").ok(),
            timeout_secs,
            endpoint: config.get_string("endpoint").ok(),
            token_file: config.get_string("token_file").ok().map(PathBuf::from),
        })
    }
}

/// Unified configuration for meshconn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Context used when `--context` is not given
    pub current_context: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    pub contexts: BTreeMap<String, ContextConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut contexts = BTreeMap::new();
        contexts.insert(DEFAULT_CONTEXT.to_string(), ContextConfig::default());
        Self {
            current_context: DEFAULT_CONTEXT.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            contexts,
        }
    }
}

/// The resolved configuration context a command runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    /// Endpoint without trailing slash
    pub endpoint: String,
    pub platform: String,
    pub token_file: Option<PathBuf>,
    pub timeout: Duration,
}

/// Get the XDG config directory for meshconn.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "meshconn").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence, reading `MESHCONN_*` from the environment.
    ///
    /// # Arguments
    /// * `config_path` - Explicit config file; must exist when given
    /// * `context` - Context name selected on the command line
    pub fn load(config_path: Option<&Path>, context: Option<&str>) -> ApplicationResult<Self> {
        Self::load_with_env(config_path, context, &EnvOverrides::from_env()?)
    }

    /// Load settings with explicitly supplied environment overrides.
    pub fn load_with_env(
        config_path: Option<&Path>,
        context: Option<&str>,
        env: &EnvOverrides,
    ) -> ApplicationResult<Self> {
        let mut current = Self::default();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                debug!("load: config file {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("load: global config {}", global_path.display());
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = current.apply_overrides(env, context);
        current.expand_paths()?;

        Ok(current)
    }

    /// Merge file config onto self.
    ///
    /// - Scalars: overlay wins if Some
    /// - Contexts: merged by name, new names are added on top of the defaults
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut contexts = self.contexts.clone();
        for (name, raw) in &overlay.contexts {
            let merged = contexts
                .get(name)
                .cloned()
                .unwrap_or_default()
                .merge(raw);
            contexts.insert(name.clone(), merged);
        }

        Self {
            current_context: overlay
                .current_context
                .clone()
                .unwrap_or_else(|| self.current_context.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            contexts,
        }
    }

    fn apply_overrides(mut self, env: &EnvOverrides, context: Option<&str>) -> Self {
        if let Some(name) = &env.current_context {
            self.current_context = name.clone();
        }
        if let Some(name) = context {
            self.current_context = name.to_string();
        }
        if let Some(secs) = env.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(selected) = self.contexts.get_mut(&self.current_context) {
            if let Some(endpoint) = &env.endpoint {
                selected.endpoint = endpoint.clone();
            }
            if let Some(token_file) = &env.token_file {
                selected.token_file = Some(token_file.clone());
            }
        }
        self
    }

    /// Expand `~` and `$VAR` in token file paths.
    ///
    /// An undefined variable is a config error naming the variable.
    fn expand_paths(&mut self) -> ApplicationResult<()> {
        for (name, ctx) in self.contexts.iter_mut() {
            if let Some(path) = &ctx.token_file {
                let raw = path.to_string_lossy().to_string();
                let expanded = shellexpand::full(&raw).map_err(|e| ApplicationError::Config {
                    message: format!(
                        "context '{}': cannot expand token file '{}': variable '{}' is not set",
                        name, raw, e.var_name
                    ),
                })?;
                ctx.token_file = Some(PathBuf::from(expanded.into_owned()));
            }
        }
        Ok(())
    }

    /// Resolve the selected context.
    pub fn current(&self) -> ApplicationResult<Context> {
        let name = &self.current_context;
        let cfg = self
            .contexts
            .get(name)
            .ok_or_else(|| ApplicationError::Config {
                message: format!(
                    "context '{}' not found, available contexts: {}",
                    name,
                    self.contexts.keys().join(", ")
                ),
            })?;

        let endpoint = cfg.endpoint.trim().trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ApplicationError::Config {
                message: format!(
                    "context '{}': endpoint '{}' must start with http:// or https://",
                    name, cfg.endpoint
                ),
            });
        }

        Ok(Context {
            name: name.clone(),
            endpoint,
            platform: cfg.platform.clone(),
            token_file: cfg.token_file.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# meshconn configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/meshconn/config.toml (or --config <file>)
#   Env:  MESHCONN_* environment variables
#   CLI:  --context <name>
#
# Environment variables:
#   MESHCONN_CURRENT_CONTEXT, MESHCONN_TIMEOUT_SECS
#   MESHCONN_ENDPOINT, MESHCONN_TOKEN_FILE (apply to the selected context)

# Context used when --context is not given
current_context = "local"

# HTTP request timeout in seconds
# timeout_secs = 30

[contexts.local]
endpoint = "http://localhost:9081"
platform = "docker"
# token_file = "~/.meshery/auth.json"

# [contexts.staging]
# endpoint = "https://meshery.staging.example.com"
# platform = "kubernetes"
# token_file = "$HOME/.config/meshconn/staging.token"
"#
        .to_string()
    }
}

/// Source of the configuration context for a command invocation.
pub trait ContextLoader {
    fn load_context(&self) -> ApplicationResult<Context>;
}

/// Loads the context from files and environment on demand.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    pub config_path: Option<PathBuf>,
    pub context: Option<String>,
}

impl SettingsLoader {
    pub fn new(config_path: Option<PathBuf>, context: Option<String>) -> Self {
        Self {
            config_path,
            context,
        }
    }

    pub fn load_settings(&self) -> ApplicationResult<Settings> {
        Settings::load(self.config_path.as_deref(), self.context.as_deref())
    }
}

impl ContextLoader for SettingsLoader {
    fn load_context(&self) -> ApplicationResult<Context> {
        self.load_settings()?.current()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

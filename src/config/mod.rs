//! Configuration management for `hdms`.
//!
//! Configuration is loaded from YAML files, lowest precedence first:
//! - Built-in defaults
//! - User config (~/.config/hdms/config.yaml)
//! - Workspace config (.hdms/config.yaml, searched upwards from the cwd)
//! - An explicit `--config` file
//! - Environment variable overrides
//! - Command-line flags
//!
//! File layers are merged key by key, so a workspace file only needs the
//! keys it changes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use hdms_core::DeskConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const WORKSPACE_DIR_NAME: &str = ".hdms";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_SLA_WINDOW_HOURS: &str = "HDMS_SLA_WINDOW_HOURS";
pub const ENV_INACTIVITY_LIMIT_SECONDS: &str = "HDMS_INACTIVITY_LIMIT_SECONDS";
pub const ENV_SOURCE: &str = "HDMS_SOURCE";
pub const ENV_AUTH_TOKEN: &str = "HDMS_AUTH_TOKEN";

/// Effective CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Snapshot file path or `http(s)://` ticket feed URL.
    pub source: Option<String>,
    /// Snapshot file used when the source is unavailable.
    pub fallback: Option<PathBuf>,
    /// Timeout for HTTP ticket feeds.
    pub request_timeout_secs: u64,
    /// Dashboard and session policy.
    pub policy: DeskConfig,
    /// Bearer token for the ticket feed. Never read from or written to files.
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            fallback: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            policy: DeskConfig::default(),
            auth_token: None,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error if any policy value or the request timeout is out of range.
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        if self.request_timeout_secs == 0 {
            bail!("requestTimeoutSecs must be greater than zero");
        }
        Ok(())
    }

    /// Apply `HDMS_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = non_empty(lookup(ENV_SLA_WINDOW_HOURS)) {
            self.policy.sla_window_hours = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SLA_WINDOW_HOURS}='{raw}' is not a number"))?;
        }
        if let Some(raw) = non_empty(lookup(ENV_INACTIVITY_LIMIT_SECONDS)) {
            self.policy.inactivity_limit_seconds = raw.trim().parse().with_context(|| {
                format!("{ENV_INACTIVITY_LIMIT_SECONDS}='{raw}' is not a whole number")
            })?;
        }
        if let Some(source) = non_empty(lookup(ENV_SOURCE)) {
            self.source = Some(source);
        }
        if let Some(token) = non_empty(lookup(ENV_AUTH_TOKEN)) {
            self.auth_token = Some(token);
        }
        Ok(())
    }

    /// Apply command-line flags, the highest precedence layer.
    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(source) = &cli.source {
            self.source = Some(source.clone());
        }
        if let Some(fallback) = &cli.fallback {
            self.fallback = Some(fallback.clone());
        }
        if let Some(token) = &cli.token {
            self.auth_token = Some(token.clone());
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Flags that override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub source: Option<String>,
    pub fallback: Option<PathBuf>,
    pub token: Option<String>,
}

/// Config files that exist and will be merged, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub user: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Locate config files for the current user and working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file does not exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let explicit = match explicit {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => bail!("Config file not found: {}", path.display()),
            None => None,
        };
        Ok(Self {
            user: user_config_path().filter(|p| p.is_file()),
            workspace: discover_workspace_config(&cwd),
            explicit,
        })
    }

    fn layers(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.user, &self.workspace, &self.explicit]
            .into_iter()
            .flatten()
    }
}

/// `~/.config/hdms/config.yaml` (platform config dir).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hdms").join(CONFIG_FILE_NAME))
}

/// Walk up from `start` looking for `.hdms/config.yaml`.
#[must_use]
pub fn discover_workspace_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(WORKSPACE_DIR_NAME).join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the effective configuration from the environment of this process.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or parsed, an environment
/// override is malformed, or the result fails validation.
pub fn load_config(cli: &CliOverrides) -> Result<AppConfig> {
    let paths = ConfigPaths::discover(cli.config.as_deref())?;
    load_config_from(&paths, |key| std::env::var(key).ok(), cli)
}

/// Load configuration from explicit layers. Used by [`load_config`] and tests.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from(
    paths: &ConfigPaths,
    env: impl Fn(&str) -> Option<String>,
    cli: &CliOverrides,
) -> Result<AppConfig> {
    let mut merged = Value::Mapping(Mapping::new());
    for path in paths.layers() {
        debug!(path = %path.display(), "Loading config layer");
        let layer = read_layer(path)?;
        merge_values(&mut merged, layer);
    }

    let mut config: AppConfig =
        serde_yaml::from_value(merged).context("Invalid configuration")?;
    config.apply_env(env)?;
    config.apply_cli(cli);
    config.validate()?;
    Ok(config)
}

fn read_layer(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let value: Value = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    match value {
        Value::Mapping(_) => Ok(normalize_keys(value)),
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        _ => bail!("Config file {} must contain a mapping", path.display()),
    }
}

/// Rewrite `snake_case` keys as `camelCase` so layers using either spelling merge.
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(s) => Value::String(camel_case(&s)),
                        other => other,
                    };
                    (key, normalize_keys(value))
                })
                .collect(),
        ),
        other => other,
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Deep-merge `overlay` into `base`; mappings merge, everything else replaces.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// JSON schema of the config file.
#[must_use]
pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(AppConfig)
}

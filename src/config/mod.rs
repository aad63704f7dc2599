//! Configuration loading.
//!
//! Defaults, then an optional JSON5 file, then `XCARD_*` environment
//! overrides. The resulting [`Config`] is validated before use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{LogFormat, LoggingConfig};
use crate::twitter::client::ClientOptions;
use crate::twitter::constants::{GUEST_ACTIVATE_URL, TWEET_BY_REST_ID_URL};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "xcard.json5";

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "XCARD_CONFIG";

pub const DEFAULT_BIND: &str = "0.0.0.0:8787";
pub const DEFAULT_CANONICAL_BASE: &str = "https://x.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Origin of canonical post URLs (redirect targets, `og:url`).
    pub canonical_base: String,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
    /// Additional user-agent substrings treated as preview bots.
    pub extra_bot_agents: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            canonical_base: DEFAULT_CANONICAL_BASE.to_string(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
            extra_bot_agents: Vec::new(),
        }
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    pub activate_url: String,
    pub lookup_url: String,
    /// Overrides the built-in browser user agent when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            activate_url: GUEST_ACTIVATE_URL.to_string(),
            lookup_url: TWEET_BY_REST_ID_URL.to_string(),
            user_agent: None,
            timeout_secs: 15,
        }
    }
}

impl UpstreamConfig {
    pub fn client_options(&self) -> ClientOptions {
        let options = ClientOptions::default()
            .with_endpoints(&self.activate_url, &self.lookup_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.user_agent {
            Some(ua) => options.with_user_agent(ua),
            None => options,
        }
    }
}

/// Load configuration.
///
/// `path` is an explicitly requested file and must exist. Without it
/// `XCARD_CONFIG` names the file (also required to exist); failing that the
/// default path is tried and silently skipped when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] reading environment variables through `lookup`.
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let env_path = lookup(CONFIG_PATH_ENV)
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let mut config = match path.or(env_path.as_deref()) {
        Some(path) => read_config_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                read_config_file(default_path)?
            } else {
                Config::default()
            }
        }
    };
    apply_env_overrides(&mut config, lookup)?;
    validate(&mut config)?;

    tracing::debug!(
        bind = %config.bind,
        canonical_base = %config.canonical_base,
        extra_bots = config.extra_bot_agents.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse JSON5 configuration text.
pub fn parse_config(raw: &str) -> Result<Config, String> {
    json5::from_str(raw).map_err(|e| e.to_string())
}

/// Apply `XCARD_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = lookup("XCARD_BIND") {
        config.bind = v;
    }
    if let Some(v) = lookup("XCARD_CANONICAL_BASE") {
        config.canonical_base = v;
    }
    if let Some(v) = lookup("XCARD_ACTIVATE_URL") {
        config.upstream.activate_url = v;
    }
    if let Some(v) = lookup("XCARD_LOOKUP_URL") {
        config.upstream.lookup_url = v;
    }
    if let Some(v) = lookup("XCARD_USER_AGENT") {
        config.upstream.user_agent = Some(v);
    }
    if let Some(v) = lookup("XCARD_TIMEOUT_SECS") {
        config.upstream.timeout_secs = v.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "XCARD_TIMEOUT_SECS",
            message: format!("expected whole seconds, got \"{v}\""),
        })?;
    }
    if let Some(v) = lookup("XCARD_LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = lookup("XCARD_LOG_FORMAT") {
        config.logging.format = match v.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "XCARD_LOG_FORMAT",
                    message: format!("expected \"text\" or \"json\", got \"{v}\""),
                })
            }
        };
    }
    if let Some(v) = lookup("XCARD_BOT_AGENTS") {
        config.extra_bot_agents = v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    Ok(())
}

/// Validate and normalize a loaded configuration.
pub fn validate(config: &mut Config) -> Result<(), ConfigError> {
    check_http_url("canonicalBase", &config.canonical_base)?;
    check_http_url("upstream.activateUrl", &config.upstream.activate_url)?;
    check_http_url("upstream.lookupUrl", &config.upstream.lookup_url)?;
    config.canonical_base = config.canonical_base.trim_end_matches('/').to_string();

    if config.upstream.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            key: "upstream.timeoutSecs",
            message: "must be at least 1".to_string(),
        });
    }
    if config.bind.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key: "bind",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn check_http_url(key: &'static str, raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key,
        message: format!("invalid URL \"{raw}\": {e}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid {
            key,
            message: format!("URL must use http or https scheme, got \"{scheme}\""),
        }),
    }
}

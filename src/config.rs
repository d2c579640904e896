//! Runner configuration loaded from environment variables.
//!
//! The configuration is shared through a [`ConfigHandle`] that is passed into the
//! runner explicitly. Reads happen at discovery and dispatch time; writes are
//! expected during setup only. Last write wins.

use std::collections::BTreeMap;
use std::env;
use std::sync::{Arc, PoisonError, RwLock};

/// Default values.
pub mod defaults {
    /// Lower bound for concurrent suite loads.
    pub const MIN_LOAD_CONCURRENT: usize = 2;
}

/// Concurrent suite loads when nothing is configured: the CPU count, at least 2.
pub fn default_load_concurrent() -> usize {
    num_cpus::get().max(defaults::MIN_LOAD_CONCURRENT)
}

/// Process-wide runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum number of suite files loaded at once
    pub load_concurrent: usize,
    /// Cookies appended to every request
    pub cookies: Option<BTreeMap<String, String>>,
    /// Prefix prepended to every suite URL
    pub url_prefix: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            load_concurrent: default_load_concurrent(),
            cookies: None,
            url_prefix: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APITEST_LOAD_CONCURRENT`: Concurrent suite loads (default: CPU count, at least 2)
    /// - `APITEST_URL_PREFIX`: Prefix for every suite URL (default: none)
    /// - `APITEST_COOKIES`: Cookies for every request, as `name=value; name2=value2`
    pub fn from_env() -> Result<Self, ConfigError> {
        let load_concurrent = match env::var("APITEST_LOAD_CONCURRENT") {
            Ok(raw) => parse_load_concurrent(&raw)?,
            Err(_) => default_load_concurrent(),
        };

        let url_prefix = env::var("APITEST_URL_PREFIX")
            .ok()
            .filter(|prefix| !prefix.is_empty());

        let cookies = match env::var("APITEST_COOKIES") {
            Ok(raw) => Some(parse_cookies(&raw)?),
            Err(_) => None,
        };

        Ok(RunnerConfig {
            load_concurrent,
            cookies,
            url_prefix,
        })
    }

    /// Apply a partial update.
    pub fn merge(&mut self, patch: ConfigPatch) {
        if let Some(load_concurrent) = patch.load_concurrent {
            self.load_concurrent = load_concurrent;
        }
        if let Some(cookies) = patch.cookies {
            self.cookies = cookies;
        }
        if let Some(url_prefix) = patch.url_prefix {
            self.url_prefix = url_prefix;
        }
    }

    /// Build the final request URL for a suite URL.
    pub fn request_url(&self, url: &str) -> String {
        match self.url_prefix {
            Some(ref prefix) => format!("{}{}", prefix, url),
            None => url.to_string(),
        }
    }
}

/// Partial configuration update. `None` fields keep their current value.
///
/// `Some(None)` clears an optional setting.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub load_concurrent: Option<usize>,
    pub cookies: Option<Option<BTreeMap<String, String>>>,
    pub url_prefix: Option<Option<String>>,
}

/// Shared handle to the runner configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<RunnerConfig>>,
}

impl ConfigHandle {
    /// Create a handle holding `config`.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Return a copy of the current configuration.
    pub fn get(&self) -> RunnerConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `patch` into the configuration and return a copy of the result.
    pub fn set(&self, patch: ConfigPatch) -> RunnerConfig {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        config.merge(patch);
        config.clone()
    }
}

fn parse_load_concurrent(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue(
            "APITEST_LOAD_CONCURRENT must be a positive number",
        )),
    }
}

fn parse_cookies(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut cookies = BTreeMap::new();
    for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (name, value) = pair.split_once('=').ok_or(ConfigError::InvalidValue(
            "APITEST_COOKIES must be a list of name=value pairs",
        ))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "APITEST_COOKIES contains a cookie without a name",
            ));
        }
        cookies.insert(name.to_string(), value.trim().to_string());
    }
    Ok(cookies)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}

use crate::Result;
use crate::facts::RetryPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default settings TOML content, embedded from `default_pulse.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_pulse.toml");

/// Name of the settings file looked up when no path is given.
pub const CONFIG_FILE_NAME: &str = "pulse.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How long fetched metrics are reused
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub cache_ttl: Duration,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default = "default_npm_downloads_url")]
    pub npm_downloads_url: String,

    #[serde(default = "default_npm_registry_url")]
    pub npm_registry_url: String,

    /// Upper bound on a single request attempt
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Retries on top of the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_cache_ttl() -> Duration {
    crate::facts::DEFAULT_CACHE_TTL
}

fn default_github_api_url() -> String {
    crate::facts::hosting::DEFAULT_GITHUB_API_URL.to_string()
}

fn default_npm_downloads_url() -> String {
    crate::facts::registry::DEFAULT_NPM_DOWNLOADS_URL.to_string()
}

fn default_npm_registry_url() -> String {
    crate::facts::registry::DEFAULT_NPM_REGISTRY_URL.to_string()
}

const fn default_request_timeout() -> Duration {
    crate::facts::DEFAULT_REQUEST_TIMEOUT
}

const fn default_max_retries() -> u32 {
    crate::facts::DEFAULT_MAX_RETRIES
}

impl Config {
    /// Load settings from a file or use defaults
    ///
    /// Without an explicit path, `pulse.toml` in `base_dir` is used if it exists.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading settings file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading settings file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing settings file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default settings to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default settings to {output_path}"))?;
        Ok(())
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.request_timeout)
    }

    fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_zero() {
            return Err(app_err!("cache_ttl must be greater than zero"));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        validate_url("github_api_url", &self.github_api_url)?;
        validate_url("npm_downloads_url", &self.npm_downloads_url)?;
        validate_url("npm_registry_url", &self.npm_registry_url)?;

        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).into_app_err_with(|| format!("{name} is not a valid URL: '{value}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(app_err!("{name} must be an http or https URL, got '{value}'"));
    }

    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_pulse.toml should be valid TOML that deserializes to Config")
    }
}

//! Explorer runtime configuration.
//!
//! # Responsibility
//! - Resolve backend address, request timeout, search contract and log level
//!   from environment-style key lookup.
//!
//! # Invariants
//! - `base_url` is an absolute `http`/`https` URL.
//! - `timeout_ms` is within `1..=MAX_TIMEOUT_MS`.
//! - Blank values fall back to defaults instead of failing.

use crate::logging::default_log_level;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_BASE_URL: &str = "ARTICLEMAP_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ARTICLEMAP_TIMEOUT_MS";
pub const ENV_SEARCH_CONTRACT: &str = "ARTICLEMAP_SEARCH_CONTRACT";
pub const ENV_LOG_LEVEL: &str = "ARTICLEMAP_LOG_LEVEL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// How `/search` results identify matching articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchContract {
    /// Results carry article ids (or records with `id`).
    #[default]
    Ids,
    /// Legacy backends return text labels matched locally against
    /// title/abstract.
    Labels,
}

impl SearchContract {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ids" | "id" => Some(Self::Ids),
            "labels" | "label" | "legacy" => Some(Self::Labels),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ids => "ids",
            Self::Labels => "labels",
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl { value: String, message: String },
    InvalidTimeout(String),
    InvalidSearchContract(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { value, message } => {
                write!(f, "invalid {ENV_BASE_URL} `{value}`: {message}")
            }
            Self::InvalidTimeout(value) => write!(
                f,
                "invalid {ENV_TIMEOUT_MS} `{value}`; expected 1..={MAX_TIMEOUT_MS}"
            ),
            Self::InvalidSearchContract(value) => write!(
                f,
                "invalid {ENV_SEARCH_CONTRACT} `{value}`; expected ids|labels"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved explorer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub base_url: Url,
    pub timeout_ms: u64,
    pub search_contract: SearchContract,
    pub log_level: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            search_contract: SearchContract::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    ///
    /// Unset or blank keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(raw) = read(ENV_BASE_URL) {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse_timeout_ms(&raw)?;
        }
        if let Some(raw) = read(ENV_SEARCH_CONTRACT) {
            config.search_contract = SearchContract::parse(&raw)
                .ok_or(ConfigError::InvalidSearchContract(raw))?;
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level = raw;
        }
        Ok(config)
    }

    /// Replaces the backend address, validating it like the env path does.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw.trim())?;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if !(1..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
            return Err(ConfigError::InvalidTimeout(timeout_ms.to_string()));
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        message,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("url must have a host".to_string()));
    }
    Ok(url)
}

pub fn parse_timeout_ms(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if (1..=MAX_TIMEOUT_MS).contains(&value) => Ok(value),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

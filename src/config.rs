use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::cli::RequestArgs;
use crate::formats::SiteKind;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_API_ITEM_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "invalid delay range [{min_secs}, {max_secs}]: bounds must be finite, non-negative and ordered"
    )]
    InvalidDelayRange { min_secs: f64, max_secs: f64 },
    #[error("invalid timeout {0}s: must be positive and representable as a duration")]
    InvalidTimeout(f64),
    #[error("no sites configured")]
    NoSites,
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Seconds to wait before each request, sampled uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self, ConfigError> {
        let range = Self { min_secs, max_secs };
        range.validate()?;
        Ok(range)
    }

    pub fn fixed(secs: f64) -> Result<Self, ConfigError> {
        Self::new(secs, secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = Duration::try_from_secs_f64(self.min_secs).is_ok()
            && Duration::try_from_secs_f64(self.max_secs).is_ok()
            && self.min_secs <= self.max_secs;
        if !valid {
            return Err(ConfigError::InvalidDelayRange {
                min_secs: self.min_secs,
                max_secs: self.max_secs,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> Result<(Duration, Duration), ConfigError> {
        self.validate()?;
        let invalid = |_| ConfigError::InvalidDelayRange {
            min_secs: self.min_secs,
            max_secs: self.max_secs,
        };
        Ok((
            Duration::try_from_secs_f64(self.min_secs).map_err(invalid)?,
            Duration::try_from_secs_f64(self.max_secs).map_err(invalid)?,
        ))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SiteKind,
}

impl SiteConfig {
    pub fn new(kind: SiteKind, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub delay_range: DelayRange,
    pub timeout_secs: f64,
    /// Maximum entries kept from an array API response; `None` keeps all.
    pub api_item_limit: Option<usize>,
    pub sites: Vec<SiteConfig>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            delay_range: DelayRange::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_item_limit: Some(DEFAULT_API_ITEM_LIMIT),
            sites: default_sites(),
        }
    }
}

pub fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig::new(SiteKind::HtmlDemo, "https://httpbin.org/html"),
        SiteConfig::new(SiteKind::QuotesSite, "http://quotes.toscrape.com/"),
        SiteConfig::new(SiteKind::BooksSite, "http://books.toscrape.com/"),
        SiteConfig::new(
            SiteKind::ApiDemo,
            "https://jsonplaceholder.typicode.com/posts",
        ),
    ]
}

impl ScrapeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delay_range.validate()?;
        self.timeout()?;
        if self.sites.is_empty() {
            return Err(ConfigError::NoSites);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => Err(ConfigError::InvalidTimeout(self.timeout_secs)),
        }
    }
}

/// Builds the effective config: file (or defaults), then CLI overrides.
pub fn resolve(args: &RequestArgs) -> anyhow::Result<ScrapeConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            ScrapeConfig::load(Path::new(path)).with_context(|| format!("load config: {path}"))?
        }
        None => ScrapeConfig::default(),
    };

    if let Some(min_secs) = args.min_delay {
        config.delay_range.min_secs = min_secs;
    }
    if let Some(max_secs) = args.max_delay {
        config.delay_range.max_secs = max_secs;
    }
    if let Some(timeout_secs) = args.timeout {
        config.timeout_secs = timeout_secs;
    }
    if let Some(user_agent) = &args.user_agent {
        config.user_agent = user_agent.clone();
    }

    config.validate()?;
    Ok(config)
}

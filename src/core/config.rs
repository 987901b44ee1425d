use super::source::ChangeDetection;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Nbp,
    Ecb,
    Exchangerate,
}

impl SourceKind {
    pub fn default_name(&self) -> &'static str {
        match self {
            SourceKind::Nbp => "NBP",
            SourceKind::Ecb => "ECB",
            SourceKind::Exchangerate => "Exchangerate",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Display name used in notifications, defaults to the provider name.
    pub name: Option<String>,
    pub base_url: Option<String>,
    /// Only used by the Exchangerate provider.
    pub access_key: Option<String>,
}

impl SourceConfig {
    pub fn new(kind: SourceKind) -> Self {
        SourceConfig {
            kind,
            name: None,
            base_url: None,
            access_key: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.default_name())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Poll one source after another, in configuration order.
    #[default]
    Sequential,
    /// Fetch all sources of a sweep at once.
    Concurrent,
}

fn default_poll_interval_secs() -> f64 {
    2.5
}

fn default_request_timeout_secs() -> f64 {
    10.0
}

/// Converts a seconds setting, rejecting values that overflow or round to zero.
fn positive_duration(field: &str, secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => bail!("{field} must be a positive number of seconds, got {secs}"),
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(SourceKind::Nbp),
        SourceConfig::new(SourceKind::Ecb),
        SourceConfig::new(SourceKind::Exchangerate),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: f64,
    #[serde(default)]
    pub sweep_mode: SweepMode,
    /// Rate moves up to this size are not reported as changes. Unset means
    /// any difference counts.
    #[serde(default)]
    pub change_tolerance: Option<f64>,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            sweep_mode: SweepMode::default(),
            change_tolerance: None,
            sources: default_sources(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "ratewatch", "ratewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.poll_interval()?;
        self.request_timeout()?;
        if let Some(tolerance) = self.change_tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                bail!("change_tolerance must not be negative, got {tolerance}");
            }
        }
        if self.sources.is_empty() {
            bail!("At least one rate source must be configured");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        positive_duration("poll_interval_secs", self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        positive_duration("request_timeout_secs", self.request_timeout_secs)
    }

    pub fn change_detection(&self) -> ChangeDetection {
        self.change_tolerance
            .map_or(ChangeDetection::Exact, ChangeDetection::Tolerance)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

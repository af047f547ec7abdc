//! TOML application configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup: both strategies enabled, Yahoo data, `message.txt` output.

use std::path::{Path, PathBuf};

use gaalab_core::data::Universe;
use gaalab_core::indicators::DEFAULT_HORIZONS;
use gaalab_core::signal::{LeverageConfig, SelectionMode};
use gaalab_core::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `output.webhook_url` when set and non-empty.
pub const WEBHOOK_ENV: &str = "GAALAB_WEBHOOK_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub data: DataConfig,
    pub gaa: GaaConfig,
    pub spy_tips: SpyTipsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Rewritten on every run.
    pub message_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            message_file: PathBuf::from("message.txt"),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Calendar days of history requested by the GAA strategy.
    pub lookback_days: u32,
    /// Directory of `{SYMBOL}.csv` files used after Yahoo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_dir: Option<PathBuf>,
    /// Skip Yahoo entirely.
    pub offline: bool,
    /// Fall back to generated prices. Never enable for real signals.
    pub synthetic: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            lookback_days: 730,
            csv_dir: None,
            offline: false,
            synthetic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaaConfig {
    pub enabled: bool,
    /// Headline prefix, e.g. "GAA Rebalance (Jun 2024)".
    pub label: String,
    pub state_file: PathBuf,
    pub top_n: usize,
    pub sma_window: usize,
    pub horizons: Vec<u32>,
    pub selection_mode: SelectionMode,
    /// Show the month in progress next to the recorded period.
    pub preview: bool,
    pub universe: Universe,
    pub leverage: LeverageConfig,
}

impl Default for GaaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "GAA".to_string(),
            state_file: PathBuf::from("gaa_hist.csv"),
            top_n: 3,
            sma_window: 150,
            horizons: DEFAULT_HORIZONS.to_vec(),
            selection_mode: SelectionMode::default(),
            preview: true,
            universe: Universe::default_gaa(),
            leverage: LeverageConfig::default(),
        }
    }
}

impl GaaConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            top_n: self.top_n,
            sma_window: self.sma_window,
            horizons: self.horizons.clone(),
            mode: self.selection_mode,
            leverage: self.leverage.clone(),
            preview: self.preview,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyTipsConfig {
    pub enabled: bool,
    pub risk_symbol: String,
    pub safe_symbol: String,
    pub lookback_days: u32,
    /// Notify on every run instead of only when the signal flips.
    pub daily_notification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for SpyTipsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            risk_symbol: "SPY".to_string(),
            safe_symbol: "TIP".to_string(),
            lookback_days: 365,
            daily_notification: true,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, apply environment overrides and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string. No environment overrides, no validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_env(&mut self) {
        self.apply_webhook_override(std::env::var(WEBHOOK_ENV).ok());
    }

    fn apply_webhook_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.output.webhook_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.data.lookback_days == 0 {
            return invalid("data.lookback_days must be at least 1".into());
        }

        let gaa = &self.gaa;
        if gaa.top_n == 0 {
            return invalid("gaa.top_n must be at least 1".into());
        }
        if gaa.sma_window == 0 {
            return invalid("gaa.sma_window must be at least 1".into());
        }
        if gaa.horizons.is_empty() || gaa.horizons.contains(&0) {
            return invalid("gaa.horizons must be non-empty and positive".into());
        }
        if gaa.horizons.windows(2).any(|w| w[0] >= w[1]) {
            return invalid("gaa.horizons must be sorted and unique".into());
        }
        let lev = &gaa.leverage;
        if lev.enabled {
            if lev.sma_window == 0 || lev.vol_window < 2 {
                return invalid("gaa.leverage windows must be at least 1 (sma) and 2 (vol)".into());
            }
            if !(lev.max_vol.is_finite() && lev.max_vol > 0.0) || lev.factor == 0 {
                return invalid("gaa.leverage.max_vol and factor must be positive".into());
            }
        }
        if gaa.universe.is_empty() {
            return invalid("gaa.universe must not be empty".into());
        }
        gaa.universe
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("gaa.universe: {e}")))?;

        let spy = &self.spy_tips;
        if spy.risk_symbol.trim().is_empty() || spy.safe_symbol.trim().is_empty() {
            return invalid("spy_tips symbols must not be empty".into());
        }
        if spy.lookback_days == 0 {
            return invalid("spy_tips.lookback_days must be at least 1".into());
        }
        Ok(())
    }
}

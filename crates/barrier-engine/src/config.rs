//! Configuration for the barrier engine.
//!
//! Supports loading from a TOML file with environment variable and CLI
//! overrides. Defaults carry the documented strategy constants.

use std::path::Path;

use anyhow::{bail, Context, Result};
use barrier_common::{CryptoAsset, WindowDuration};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::barrier::BarrierThresholds;

/// Top-level configuration for the engine and monitor.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Asset whose up/down markets are monitored.
    pub asset: CryptoAsset,

    /// Market window duration to target.
    pub window_duration: WindowDuration,

    /// Logging level.
    pub log_level: String,

    /// Polling cadence and lookback for the monitor loop.
    pub monitor: MonitorConfig,

    /// Indicator periods.
    pub indicators: IndicatorConfig,

    /// Barrier thresholds.
    pub barriers: BarrierThresholds,

    /// Execution-window entry gate.
    pub window: WindowConfig,
}

/// Monitor loop cadence.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds between evaluation ticks.
    pub poll_interval_secs: u64,

    /// 1-minute candles to request per tick.
    pub candle_lookback: u32,

    /// Pause before moving on to the next market (seconds).
    pub next_market_wait_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            candle_lookback: 60,
            next_market_wait_secs: 10,
        }
    }
}

/// Indicator periods.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub bollinger_period: usize,
    pub bollinger_stddev_mult: Decimal,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            bollinger_period: 20,
            bollinger_stddev_mult: dec!(2.0),
            atr_period: 14,
        }
    }
}

/// Execution-window entry gate, in minutes before settlement.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub entry_min_minutes: Decimal,
    pub entry_max_minutes: Decimal,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            entry_min_minutes: dec!(3.0),
            entry_max_minutes: dec!(5.0),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset: CryptoAsset::Btc,
            window_duration: WindowDuration::FifteenMin,
            log_level: "info".to_string(),
            monitor: MonitorConfig::default(),
            indicators: IndicatorConfig::default(),
            barriers: BarrierThresholds::default(),
            window: WindowConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, filling gaps with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlConfig = toml::from_str(content).context("Failed to parse TOML config")?;
        file.try_into()
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("BARRIER_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(asset) = std::env::var("BARRIER_ASSET") {
            self.asset = asset
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("BARRIER_ASSET")?;
        }
        Ok(())
    }

    /// Apply CLI overrides.
    pub fn apply_cli_overrides(
        &mut self,
        asset: Option<CryptoAsset>,
        window: Option<WindowDuration>,
        log_level: Option<String>,
    ) {
        if let Some(asset) = asset {
            self.asset = asset;
        }
        if let Some(window) = window {
            self.window_duration = window;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
    }

    /// Validate cross-field constraints before the monitor starts.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be positive");
        }
        if self.indicators.bollinger_period == 0 || self.indicators.atr_period == 0 {
            bail!("indicator periods must be positive");
        }
        let needed = self
            .indicators
            .bollinger_period
            .max(self.indicators.atr_period + 1) as u32;
        if self.monitor.candle_lookback < needed {
            bail!(
                "candle_lookback {} too small for indicators (need {})",
                self.monitor.candle_lookback,
                needed
            );
        }
        if self.window.entry_min_minutes >= self.window.entry_max_minutes {
            bail!(
                "window entry gate is empty: min {} >= max {}",
                self.window.entry_min_minutes,
                self.window.entry_max_minutes
            );
        }
        if self.barriers.min_share_price > self.barriers.max_share_price {
            bail!(
                "share price band is empty: min {} > max {}",
                self.barriers.min_share_price,
                self.barriers.max_share_price
            );
        }
        Ok(())
    }
}

/// Raw TOML shape. Every field optional; defaults fill the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    asset: Option<String>,
    window_duration: Option<String>,
    log_level: Option<String>,
    #[serde(default)]
    monitor: TomlMonitor,
    #[serde(default)]
    indicators: TomlIndicators,
    #[serde(default)]
    barriers: TomlBarriers,
    #[serde(default)]
    window: TomlWindow,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMonitor {
    poll_interval_secs: Option<u64>,
    candle_lookback: Option<u32>,
    next_market_wait_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlIndicators {
    bollinger_period: Option<usize>,
    bollinger_stddev_mult: Option<Decimal>,
    atr_period: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBarriers {
    atr_multiplier: Option<Decimal>,
    min_book_ratio: Option<Decimal>,
    min_share_price: Option<Decimal>,
    max_share_price: Option<Decimal>,
    stddev_mult: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlWindow {
    entry_min_minutes: Option<Decimal>,
    entry_max_minutes: Option<Decimal>,
}

impl TryFrom<TomlConfig> for EngineConfig {
    type Error = anyhow::Error;

    fn try_from(file: TomlConfig) -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Some(asset) = file.asset {
            config.asset = asset
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("asset")?;
        }
        if let Some(window) = file.window_duration {
            config.window_duration = window
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("window_duration")?;
        }
        if let Some(level) = file.log_level {
            config.log_level = level;
        }

        let m = file.monitor;
        if let Some(v) = m.poll_interval_secs {
            config.monitor.poll_interval_secs = v;
        }
        if let Some(v) = m.candle_lookback {
            config.monitor.candle_lookback = v;
        }
        if let Some(v) = m.next_market_wait_secs {
            config.monitor.next_market_wait_secs = v;
        }

        let i = file.indicators;
        if let Some(v) = i.bollinger_period {
            config.indicators.bollinger_period = v;
        }
        if let Some(v) = i.bollinger_stddev_mult {
            config.indicators.bollinger_stddev_mult = v;
        }
        if let Some(v) = i.atr_period {
            config.indicators.atr_period = v;
        }

        let b = file.barriers;
        if let Some(v) = b.stddev_mult {
            config.barriers.stddev_mult = v;
        }
        if let Some(v) = b.atr_multiplier {
            config.barriers.atr_multiplier = v;
        }
        if let Some(v) = b.min_book_ratio {
            config.barriers.min_book_ratio = v;
        }
        if let Some(v) = b.min_share_price {
            config.barriers.min_share_price = v;
        }
        if let Some(v) = b.max_share_price {
            config.barriers.max_share_price = v;
        }

        let w = file.window;
        if let Some(v) = w.entry_min_minutes {
            config.window.entry_min_minutes = v;
        }
        if let Some(v) = w.entry_max_minutes {
            config.window.entry_max_minutes = v;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_strategy_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.asset, CryptoAsset::Btc);
        assert_eq!(config.indicators.bollinger_period, 20);
        assert_eq!(config.indicators.bollinger_stddev_mult, dec!(2.0));
        assert_eq!(config.indicators.atr_period, 14);
        assert_eq!(config.barriers.atr_multiplier, dec!(1.5));
        assert_eq!(config.barriers.min_book_ratio, dec!(1.5));
        assert_eq!(config.barriers.min_share_price, dec!(0.60));
        assert_eq!(config.barriers.max_share_price, dec!(0.85));
        assert_eq!(config.window.entry_min_minutes, dec!(3.0));
        assert_eq!(config.window.entry_max_minutes, dec!(5.0));
        assert_eq!(config.monitor.poll_interval_secs, 5);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
            asset = "eth"
            log_level = "debug"

            [monitor]
            poll_interval_secs = 3

            [barriers]
            min_book_ratio = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.asset, CryptoAsset::Eth);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.monitor.poll_interval_secs, 3);
        assert_eq!(config.barriers.min_book_ratio, dec!(2.0));
        // Untouched sections keep defaults.
        assert_eq!(config.indicators.bollinger_period, 20);
        assert_eq!(config.window.entry_max_minutes, dec!(5.0));
    }

    #[test]
    fn test_unknown_asset_rejected() {
        assert!(EngineConfig::from_toml_str(r#"asset = "doge""#).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(EngineConfig::from_toml_str(r#"assett = "btc""#).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_entry_gate() {
        let mut config = EngineConfig::default();
        config.window.entry_min_minutes = dec!(5.0);
        config.window.entry_max_minutes = dec!(5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_lookback() {
        let mut config = EngineConfig::default();
        config.monitor.candle_lookback = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = EngineConfig::default();
        config.apply_cli_overrides(
            Some(CryptoAsset::Sol),
            Some(WindowDuration::OneHour),
            Some("trace".to_string()),
        );
        assert_eq!(config.asset, CryptoAsset::Sol);
        assert_eq!(config.window_duration, WindowDuration::OneHour);
        assert_eq!(config.log_level, "trace");
    }
}

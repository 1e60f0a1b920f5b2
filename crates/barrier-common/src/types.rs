//! Shared vocabulary for the barrier signal engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported cryptocurrency assets for short-lived up/down markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CryptoAsset {
    Btc,
    Eth,
    Sol,
    Xrp,
}

impl CryptoAsset {
    /// Returns the Binance trading pair symbol (e.g., "BTCUSDT").
    pub fn binance_symbol(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "BTCUSDT",
            CryptoAsset::Eth => "ETHUSDT",
            CryptoAsset::Sol => "SOLUSDT",
            CryptoAsset::Xrp => "XRPUSDT",
        }
    }

    /// Returns the lowercase slug fragment used in Polymarket event slugs.
    pub fn slug(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "btc",
            CryptoAsset::Eth => "eth",
            CryptoAsset::Sol => "sol",
            CryptoAsset::Xrp => "xrp",
        }
    }

    /// Returns the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "BTC",
            CryptoAsset::Eth => "ETH",
            CryptoAsset::Sol => "SOL",
            CryptoAsset::Xrp => "XRP",
        }
    }
}

impl std::fmt::Display for CryptoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CryptoAsset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(CryptoAsset::Btc),
            "eth" | "ethereum" => Ok(CryptoAsset::Eth),
            "sol" | "solana" => Ok(CryptoAsset::Sol),
            "xrp" => Ok(CryptoAsset::Xrp),
            _ => Err(format!("Unknown asset: {}", s)),
        }
    }
}

/// Market window duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowDuration {
    /// 5-minute markets.
    FiveMin,
    /// 15-minute markets (primary target).
    #[default]
    FifteenMin,
    /// 1-hour markets.
    OneHour,
}

impl WindowDuration {
    /// Returns the duration in minutes.
    pub fn minutes(&self) -> u32 {
        match self {
            WindowDuration::FiveMin => 5,
            WindowDuration::FifteenMin => 15,
            WindowDuration::OneHour => 60,
        }
    }

    /// Returns the duration as chrono::Duration.
    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes() as i64)
    }

    /// Fragment used in Polymarket event slugs (e.g., "btc-updown-15m-...").
    pub fn slug(&self) -> &'static str {
        match self {
            WindowDuration::FiveMin => "5m",
            WindowDuration::FifteenMin => "15m",
            WindowDuration::OneHour => "1h",
        }
    }

    /// Returns the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowDuration::FiveMin => "5m",
            WindowDuration::FifteenMin => "15min",
            WindowDuration::OneHour => "1h",
        }
    }
}

impl std::fmt::Display for WindowDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WindowDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5min" | "5m" | "5" => Ok(WindowDuration::FiveMin),
            "15min" | "15m" | "15" => Ok(WindowDuration::FifteenMin),
            "1h" | "1hour" | "60" | "60min" => Ok(WindowDuration::OneHour),
            _ => Err(format!("Unknown window duration: {}", s)),
        }
    }
}

/// Directional thesis for the current window.
///
/// `Up` means the price is expected to settle above the strike,
/// `Down` means below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The share side that pays out if this thesis is right.
    pub fn outcome(&self) -> Outcome {
        match self {
            Direction::Up => Outcome::Yes,
            Direction::Down => Outcome::No,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Outcome side for binary markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub fn opposite(&self) -> Self {
        match self {
            Outcome::Yes => Outcome::No,
            Outcome::No => Outcome::Yes,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Yes => write!(f, "YES"),
            Outcome::No => write!(f, "NO"),
        }
    }
}

/// A single OHLC bar from the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time.
    pub open_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
}

/// A single level in an order book (price + quantity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Best-ask quotes for the two outcome shares, in USDC (0.00 to 1.00).
///
/// Either side may be missing when that book has no resting asks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OutcomeQuotes {
    pub up: Option<Decimal>,
    pub down: Option<Decimal>,
}

impl OutcomeQuotes {
    /// Quote for the share backing the given thesis.
    pub fn for_direction(&self, direction: Direction) -> Option<Decimal> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}

/// Metadata for one short-lived up/down market window.
///
/// Immutable once discovered; the engine derives everything else per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketWindow {
    /// Market slug / identifier from the venue.
    pub market_id: String,
    /// The asset this market tracks.
    pub asset: CryptoAsset,
    /// Token ID for the YES (up) outcome.
    pub yes_token_id: String,
    /// Token ID for the NO (down) outcome.
    pub no_token_id: String,
    /// Strike price recorded at window open.
    #[serde(with = "rust_decimal::serde::str")]
    pub strike_price: Decimal,
    /// When the window opened.
    pub window_start: DateTime<Utc>,
    /// When the window settles.
    pub window_end: DateTime<Utc>,
    /// When this record was discovered.
    pub discovered_at: DateTime<Utc>,
}

impl MarketWindow {
    /// Returns the duration of the window in seconds.
    pub fn duration_secs(&self) -> i64 {
        (self.window_end - self.window_start).num_seconds()
    }

    /// Returns true if the window is currently active.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_start && now < self.window_end
    }

    /// Returns true if the window has settled.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_end
    }

    /// Fractional minutes until settlement. Negative after expiry.
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> Decimal {
        let millis = (self.window_end - now).num_milliseconds();
        Decimal::from(millis) / Decimal::from(60_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn window(start: &str, end: &str) -> MarketWindow {
        MarketWindow {
            market_id: "btc-updown-15m-1735732800".to_string(),
            asset: CryptoAsset::Btc,
            yes_token_id: "yes123".to_string(),
            no_token_id: "no123".to_string(),
            strike_price: dec!(100000),
            window_start: DateTime::parse_from_rfc3339(start).unwrap().with_timezone(&Utc),
            window_end: DateTime::parse_from_rfc3339(end).unwrap().with_timezone(&Utc),
            discovered_at: Utc::now(),
        }
    }

    #[test]
    fn test_binance_symbols() {
        assert_eq!(CryptoAsset::Btc.binance_symbol(), "BTCUSDT");
        assert_eq!(CryptoAsset::Xrp.binance_symbol(), "XRPUSDT");
    }

    #[test]
    fn test_asset_from_str() {
        assert_eq!("btc".parse::<CryptoAsset>().unwrap(), CryptoAsset::Btc);
        assert_eq!("Ethereum".parse::<CryptoAsset>().unwrap(), CryptoAsset::Eth);
        assert!("doge".parse::<CryptoAsset>().is_err());
    }

    #[test]
    fn test_window_duration_parse() {
        assert_eq!("15m".parse::<WindowDuration>().unwrap(), WindowDuration::FifteenMin);
        assert_eq!("1h".parse::<WindowDuration>().unwrap(), WindowDuration::OneHour);
        assert!("2h".parse::<WindowDuration>().is_err());
    }

    #[test]
    fn test_direction_outcome_mapping() {
        assert_eq!(Direction::Up.outcome(), Outcome::Yes);
        assert_eq!(Direction::Down.outcome(), Outcome::No);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }

    #[test]
    fn test_outcome_quotes_for_direction() {
        let quotes = OutcomeQuotes {
            up: Some(dec!(0.72)),
            down: Some(dec!(0.31)),
        };
        assert_eq!(quotes.for_direction(Direction::Up), Some(dec!(0.72)));
        assert_eq!(quotes.for_direction(Direction::Down), Some(dec!(0.31)));
    }

    #[test]
    fn test_market_window_duration() {
        let w = window("2026-01-01T12:00:00Z", "2026-01-01T12:15:00Z");
        assert_eq!(w.duration_secs(), 15 * 60);
    }

    #[test]
    fn test_minutes_remaining_fractional() {
        let w = window("2026-01-01T12:00:00Z", "2026-01-01T12:15:00Z");
        let now = DateTime::parse_from_rfc3339("2026-01-01T12:11:45Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(w.minutes_remaining(now), dec!(3.25));
    }

    #[test]
    fn test_minutes_remaining_negative_after_expiry() {
        let w = window("2026-01-01T12:00:00Z", "2026-01-01T12:15:00Z");
        let now = DateTime::parse_from_rfc3339("2026-01-01T12:16:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(w.minutes_remaining(now), dec!(-1));
        assert!(w.is_expired(now));
        assert!(!w.is_active(now));
    }
}

//! Binance REST client: candles, spot price, order-book depth.

use barrier_common::{BookLevel, Candle, CryptoAsset};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

const BINANCE_API_URL: &str = "https://api.binance.com";

/// Errors from the Binance REST API.
#[derive(Debug, Error)]
pub enum BinanceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Raw depth snapshot: bid and ask levels around the touch.
#[derive(Debug, Clone)]
pub struct DepthSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct DepthResponse {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

/// Thin client over the Binance public REST endpoints.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: BINANCE_API_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the latest `limit` 1-minute candles, oldest first.
    pub async fn klines(
        &self,
        asset: CryptoAsset,
        limit: u32,
    ) -> Result<Vec<Candle>, BinanceError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let rows: Vec<Vec<serde_json::Value>> = self
            .http
            .get(&url)
            .query(&[
                ("symbol", asset.binance_symbol()),
                ("interval", "1m"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        rows.iter().map(|row| parse_kline(row)).collect()
    }

    /// Fetch the current spot price.
    pub async fn spot_price(&self, asset: CryptoAsset) -> Result<Decimal, BinanceError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let ticker: TickerPrice = self
            .http
            .get(&url)
            .query(&[("symbol", asset.binance_symbol())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_decimal(&ticker.price, "ticker price")
    }

    /// Fetch order-book depth, up to `limit` levels per side.
    pub async fn depth(
        &self,
        asset: CryptoAsset,
        limit: u32,
    ) -> Result<DepthSnapshot, BinanceError> {
        let url = format!("{}/api/v3/depth", self.base_url);
        let response: DepthResponse = self
            .http
            .get(&url)
            .query(&[
                ("symbol", asset.binance_symbol()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(DepthSnapshot {
            bids: parse_levels(&response.bids)?,
            asks: parse_levels(&response.asks)?,
        })
    }
}

/// Parse one kline row. Binance returns a mixed-type array:
/// `[openTimeMs, "open", "high", "low", "close", "volume", closeTimeMs, ...]`.
fn parse_kline(row: &[serde_json::Value]) -> Result<Candle, BinanceError> {
    if row.len() < 6 {
        return Err(BinanceError::Malformed(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }
    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| BinanceError::Malformed("kline open time is not an integer".into()))?;
    let open_time = DateTime::<Utc>::from_timestamp_millis(open_time_ms)
        .ok_or_else(|| BinanceError::Malformed(format!("kline open time {} out of range", open_time_ms)))?;

    let field = |idx: usize, name: &str| -> Result<Decimal, BinanceError> {
        let s = row[idx]
            .as_str()
            .ok_or_else(|| BinanceError::Malformed(format!("kline {} is not a string", name)))?;
        parse_decimal(s, name)
    };

    Ok(Candle {
        open_time,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
        volume: field(5, "volume")?,
    })
}

fn parse_levels(raw: &[[String; 2]]) -> Result<Vec<BookLevel>, BinanceError> {
    raw.iter()
        .map(|[price, size]| {
            Ok(BookLevel::new(
                parse_decimal(price, "depth price")?,
                parse_decimal(size, "depth size")?,
            ))
        })
        .collect()
}

fn parse_decimal(s: &str, what: &str) -> Result<Decimal, BinanceError> {
    Decimal::from_str(s).map_err(|e| BinanceError::Malformed(format!("{} {:?}: {}", what, s, e)))
}

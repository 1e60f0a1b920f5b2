//! Settlement oracle prices from the Polymarket event page.
//!
//! Up/down markets settle against Chainlink Data Streams. The exact values
//! the venue uses are embedded in the server-rendered `__NEXT_DATA__` JSON
//! on the event page as `openPrice` (strike) and `closePrice` (settlement)
//! under the `crypto-prices` query. Reading them from the page avoids any
//! timing mismatch with a feed of our own.

use std::time::Duration;

use barrier_common::{CryptoAsset, WindowDuration};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const SITE_URL: &str = "https://polymarket.com";

/// Errors from the event-page oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page data not found: {0}")]
    PageData(String),
}

/// Oracle prices for one market window. Either may be unpopulated:
/// `open` appears shortly after the window starts, `close` only after
/// settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowPrices {
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct NextData {
    props: NextProps,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextProps {
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageProps {
    dehydrated_state: DehydratedState,
}

#[derive(Debug, Deserialize)]
struct DehydratedState {
    queries: Vec<Query>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Query {
    query_key: Vec<serde_json::Value>,
    state: QueryData,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    data: Option<CryptoPrices>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CryptoPrices {
    open_price: Option<f64>,
    close_price: Option<f64>,
}

/// Event page URL for a market window, derived from the slug convention
/// `{asset}-updown-{duration}-{window_start_unix}`.
pub fn event_slug(
    asset: CryptoAsset,
    duration: WindowDuration,
    window_start: DateTime<Utc>,
) -> String {
    format!(
        "{}-updown-{}-{}",
        asset.slug(),
        duration.slug(),
        window_start.timestamp()
    )
}

/// Fetches oracle prices from the event page.
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: Client,
    site_url: String,
}

impl OracleClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            site_url: SITE_URL.to_string(),
        }
    }

    /// Point the client at a different site URL (tests).
    pub fn with_site_url(http: Client, site_url: impl Into<String>) -> Self {
        Self {
            http,
            site_url: site_url.into(),
        }
    }

    /// Fetch whatever oracle prices the page currently carries.
    pub async fn window_prices(
        &self,
        asset: CryptoAsset,
        duration: WindowDuration,
        window_start: DateTime<Utc>,
    ) -> Result<WindowPrices, OracleError> {
        let url = format!(
            "{}/event/{}",
            self.site_url,
            event_slug(asset, duration, window_start)
        );
        debug!("Fetching oracle prices from {}", url);

        let html = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_prices(&html)
    }

    /// Fetch the strike (openPrice), retrying while the SSR cache catches
    /// up. Lower-traffic assets can lag several seconds after window open.
    pub async fn open_price(
        &self,
        asset: CryptoAsset,
        duration: WindowDuration,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Decimal>, OracleError> {
        self.poll_price(asset, duration, window_start, 5, |p| p.open, "openPrice")
            .await
    }

    /// Fetch the settlement (closePrice), retrying because it only
    /// populates shortly after the window ends.
    pub async fn close_price(
        &self,
        asset: CryptoAsset,
        duration: WindowDuration,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Decimal>, OracleError> {
        self.poll_price(asset, duration, window_start, 3, |p| p.close, "closePrice")
            .await
    }

    async fn poll_price(
        &self,
        asset: CryptoAsset,
        duration: WindowDuration,
        window_start: DateTime<Utc>,
        attempts: u32,
        pick: fn(&WindowPrices) -> Option<Decimal>,
        what: &str,
    ) -> Result<Option<Decimal>, OracleError> {
        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            match self.window_prices(asset, duration, window_start).await {
                Ok(prices) => {
                    if let Some(price) = pick(&prices) {
                        return Ok(Some(price));
                    }
                    debug!(
                        "{} not yet populated for {} (attempt {}/{})",
                        what, asset, attempt, attempts
                    );
                }
                Err(e) => warn!(
                    "oracle fetch failed for {} (attempt {}/{}): {}",
                    asset, attempt, attempts, e
                ),
            }
        }
        warn!("{} unavailable after {} attempts for {}", what, attempts, asset);
        Ok(None)
    }
}

/// Pull the `crypto-prices` query out of the page's `__NEXT_DATA__` blob.
fn extract_prices(html: &str) -> Result<WindowPrices, OracleError> {
    let json = next_data_json(html)
        .ok_or_else(|| OracleError::PageData("no __NEXT_DATA__ script tag".to_string()))?;

    let data: NextData = serde_json::from_str(json)
        .map_err(|e| OracleError::PageData(format!("__NEXT_DATA__ JSON: {}", e)))?;

    let prices = data
        .props
        .page_props
        .dehydrated_state
        .queries
        .into_iter()
        .find(|q| {
            q.query_key
                .first()
                .and_then(|k| k.as_str())
                .is_some_and(|k| k == "crypto-prices")
        })
        .and_then(|q| q.state.data)
        .ok_or_else(|| OracleError::PageData("no crypto-prices query".to_string()))?;

    Ok(WindowPrices {
        open: prices.open_price.and_then(Decimal::from_f64),
        close: prices.close_price.and_then(Decimal::from_f64),
    })
}

/// Slice the JSON body out of the `__NEXT_DATA__` script tag. Attribute
/// order and extras (e.g. `crossorigin`) vary between deployments.
fn next_data_json(html: &str) -> Option<&str> {
    let tag = html.find("id=\"__NEXT_DATA__\"")?;
    let body_start = tag + html[tag..].find('>')? + 1;
    let body_end = body_start + html[body_start..].find("</script>")?;
    Some(&html[body_start..body_end])
}

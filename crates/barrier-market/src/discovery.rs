//! Discovery of the currently active up/down market window.
//!
//! Short-window market slugs follow the deterministic convention
//! `{asset}-updown-{duration}-{window_start_unix}`, so the live market for
//! any instant is computable: align the clock down to the window boundary
//! and look the slug up on the Gamma API for its token ids, then read the
//! strike from the event-page oracle. Called once per window, not per tick.

use barrier_common::{CryptoAsset, MarketWindow, WindowDuration};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::oracle::{event_slug, OracleClient, OracleError};
use crate::types::{GammaEvent, TokenIds};

const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Errors that can occur during market discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("no event found for slug {0}")]
    EventNotFound(String),

    #[error("event {0} has no usable outcome token ids")]
    MissingTokenIds(String),

    #[error("strike price not yet available for {0}")]
    StrikeUnavailable(String),
}

/// Finds the live market window for one asset.
#[derive(Debug, Clone)]
pub struct MarketDiscovery {
    http: Client,
    gamma_url: String,
    oracle: OracleClient,
    duration: WindowDuration,
}

impl MarketDiscovery {
    pub fn new(http: Client, duration: WindowDuration) -> Self {
        Self {
            oracle: OracleClient::new(http.clone()),
            http,
            gamma_url: GAMMA_API_URL.to_string(),
            duration,
        }
    }

    /// Resolve the market window containing `now`.
    pub async fn current_market(
        &self,
        asset: CryptoAsset,
        now: DateTime<Utc>,
    ) -> Result<MarketWindow, DiscoveryError> {
        let (window_start, window_end) = window_bounds(now, self.duration);
        let slug = event_slug(asset, self.duration, window_start);
        info!("Looking up live market {}", slug);

        let url = format!("{}/events", self.gamma_url);
        let events: Vec<GammaEvent> = self
            .http
            .get(&url)
            .query(&[("slug", slug.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tokens = token_ids_from_events(&events).ok_or_else(|| {
            if events.is_empty() {
                DiscoveryError::EventNotFound(slug.clone())
            } else {
                DiscoveryError::MissingTokenIds(slug.clone())
            }
        })?;

        let strike_price = self
            .oracle
            .open_price(asset, self.duration, window_start)
            .await?
            .ok_or_else(|| DiscoveryError::StrikeUnavailable(slug.clone()))?;

        info!(
            "Market {} loaded: strike {}, settles {}",
            slug, strike_price, window_end
        );

        Ok(MarketWindow {
            market_id: slug,
            asset,
            yes_token_id: tokens.yes_token_id,
            no_token_id: tokens.no_token_id,
            strike_price,
            window_start,
            window_end,
            discovered_at: now,
        })
    }
}

/// Align `now` down to the containing window's boundaries.
pub fn window_bounds(
    now: DateTime<Utc>,
    duration: WindowDuration,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let period = duration.minutes() as i64 * 60;
    let start_ts = now.timestamp() - now.timestamp().rem_euclid(period);
    let start = Utc
        .timestamp_opt(start_ts, 0)
        .single()
        .unwrap_or(now);
    (start, start + duration.as_duration())
}

/// First usable token-id pair across an event list.
fn token_ids_from_events(events: &[GammaEvent]) -> Option<TokenIds> {
    events
        .iter()
        .flat_map(|e| e.markets.iter().flatten())
        .find_map(|m| m.token_ids())
}

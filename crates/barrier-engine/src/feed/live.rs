//! Live tick source composing the upstream market clients.

use async_trait::async_trait;
use barrier_common::MarketWindow;
use barrier_market::{BinanceClient, BinanceError, ClobClient, ClobError};
use chrono::Utc;
use reqwest::Client;

use super::{FeedError, TickSnapshot, TickSource};

/// Depth levels requested per side; walls beyond the volatility band are
/// filtered out downstream, so over-fetching is harmless.
const DEPTH_LEVELS: u32 = 1000;

impl From<BinanceError> for FeedError {
    fn from(e: BinanceError) -> Self {
        match e {
            BinanceError::Http(e) => FeedError::Http(e.to_string()),
            BinanceError::Malformed(m) => FeedError::Parse(m),
        }
    }
}

impl From<ClobError> for FeedError {
    fn from(e: ClobError) -> Self {
        match e {
            ClobError::Http(e) => FeedError::Http(e.to_string()),
            ClobError::Malformed { token_id, reason } => {
                FeedError::Parse(format!("book {}: {}", token_id, reason))
            }
        }
    }
}

/// Fetches one consistent snapshot per tick from the live venues.
///
/// All four upstream requests run concurrently; the snapshot timestamp is
/// taken when they have all returned, so staleness is measured against the
/// slowest leg.
#[derive(Debug, Clone)]
pub struct LiveTickSource {
    binance: BinanceClient,
    clob: ClobClient,
    candle_lookback: u32,
}

impl LiveTickSource {
    pub fn new(http: Client, candle_lookback: u32) -> Self {
        Self {
            binance: BinanceClient::new(http.clone()),
            clob: ClobClient::new(http),
            candle_lookback,
        }
    }
}

#[async_trait]
impl TickSource for LiveTickSource {
    async fn next_tick(&mut self, market: &MarketWindow) -> Result<TickSnapshot, FeedError> {
        let (spot, candles, depth, quotes) = tokio::join!(
            self.binance.spot_price(market.asset),
            self.binance.klines(market.asset, self.candle_lookback),
            self.binance.depth(market.asset, DEPTH_LEVELS),
            self.clob
                .outcome_quotes(&market.yes_token_id, &market.no_token_id),
        );
        let depth = depth?;

        Ok(TickSnapshot {
            fetched_at: Utc::now(),
            spot_price: spot?,
            candles: candles?,
            bids: depth.bids,
            asks: depth.asks,
            quotes: quotes?,
        })
    }
}

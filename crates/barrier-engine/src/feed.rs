//! Snapshot-per-tick source boundary.
//!
//! The engine's contract with the outside world: each tick it receives one
//! consistent, already-fetched [`TickSnapshot`]. It performs no concurrent
//! I/O of its own. The same evaluation code runs against:
//! - [`live::LiveTickSource`] composing the venue/exchange clients
//! - [`VecTickSource`] replaying scripted snapshots in tests

pub mod live;
pub mod replay;

pub use replay::VecTickSource;

use async_trait::async_trait;
use barrier_common::{BookLevel, Candle, MarketWindow, OutcomeQuotes};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while producing a tick snapshot.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("stream ended")]
    StreamEnded,
}

/// One tick's worth of market inputs, fetched together.
///
/// Immutable once produced; the engine never mutates a snapshot, only
/// replaces it next tick.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    /// When the snapshot was assembled (staleness reference).
    pub fetched_at: DateTime<Utc>,
    /// Current spot price from the price feed.
    pub spot_price: Decimal,
    /// OHLC history, oldest first, enough for the longest indicator.
    pub candles: Vec<Candle>,
    /// Raw bid levels from the depth feed.
    pub bids: Vec<BookLevel>,
    /// Raw ask levels from the depth feed.
    pub asks: Vec<BookLevel>,
    /// Best-ask share quotes for both outcomes.
    pub quotes: OutcomeQuotes,
}

/// Produces one snapshot per tick for a given market window.
#[async_trait]
pub trait TickSource: Send + Sync {
    /// Fetch the next consistent snapshot.
    ///
    /// # Errors
    ///
    /// Any error is recoverable at the tick level: the caller skips the
    /// tick and retries on the next one.
    async fn next_tick(&mut self, market: &MarketWindow) -> Result<TickSnapshot, FeedError>;
}

//! External market collaborators for the barrier engine.
//!
//! Thin async HTTP clients, one per upstream:
//! - Market discovery via the Polymarket Gamma API
//! - Spot price, OHLC candles and order-book depth from Binance REST
//! - YES/NO share quotes from the Polymarket CLOB book endpoint
//! - Open/close oracle prices from the Polymarket event page
//!
//! Nothing in this crate makes trading decisions; it only fetches and
//! shapes data for the engine.

pub mod binance;
pub mod clob;
pub mod discovery;
pub mod oracle;
pub mod types;

pub use binance::{BinanceClient, BinanceError, DepthSnapshot};
pub use clob::{ClobClient, ClobError};
pub use discovery::{window_bounds, DiscoveryError, MarketDiscovery};
pub use oracle::{event_slug, OracleClient, OracleError, WindowPrices};

//! Shared types for the barrier signal engine.
//!
//! CRITICAL: All prices and volumes use `rust_decimal::Decimal`.
//! NEVER use f64 for financial math.

pub mod types;

pub use types::{
    BookLevel, Candle, CryptoAsset, Direction, MarketWindow, Outcome, OutcomeQuotes,
    WindowDuration,
};

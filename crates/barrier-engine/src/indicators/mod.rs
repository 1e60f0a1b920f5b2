//! Pure indicator math.
//!
//! Every function here is a pure computation over already-fetched data:
//! no I/O, no clocks, no state. All math is `rust_decimal::Decimal`.

mod atr;
mod bollinger;
mod book;

pub use atr::atr;
pub use bollinger::{bollinger, Bands};
pub use book::{book_pressure, depth_within, BookPressure};

use barrier_common::Candle;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from indicator computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} samples, got {got}")]
    InsufficientData { required: usize, got: usize },
}

/// Shift a candle series so its last close coincides with `spot`.
///
/// The exchange history (USDT) and the settlement oracle (USD) trade at a
/// small, slowly-moving offset to each other. Evaluating oracle-referenced
/// targets against raw exchange candles would bias every band and range,
/// so the whole series is translated by `spot - last_close` first.
pub fn calibrate(candles: &[Candle], spot: Decimal) -> Vec<Candle> {
    let offset = match candles.last() {
        Some(last) => spot - last.close,
        None => return Vec::new(),
    };
    candles
        .iter()
        .map(|c| Candle {
            open_time: c.open_time,
            open: c.open + offset,
            high: c.high + offset,
            low: c.low + offset,
            close: c.close + offset,
            volume: c.volume,
        })
        .collect()
}

/// Extract the close series from candles.
pub fn closes(candles: &[Candle]) -> Vec<Decimal> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
pub(crate) fn candle(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
    Candle {
        open_time: chrono::Utc::now(),
        open,
        high,
        low,
        close,
        volume: Decimal::ONE,
    }
}

//! Average True Range over an OHLC candle series.

use barrier_common::Candle;
use rust_decimal::Decimal;

use super::IndicatorError;

/// Compute the ATR over the last `period` true ranges.
///
/// True range per bar is `max(high - low, |high - prev_close|,
/// |low - prev_close|)`. A simple moving average is used rather than the
/// exponential variant so results are reproducible from any `period + 1`
/// bar slice.
pub fn atr(candles: &[Candle], period: usize) -> Result<Decimal, IndicatorError> {
    if candles.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            required: period + 1,
            got: candles.len(),
        });
    }

    let window = &candles[candles.len() - (period + 1)..];
    let mut sum = Decimal::ZERO;
    for pair in window.windows(2) {
        let prev_close = pair[0].close;
        let bar = &pair[1];
        let tr = (bar.high - bar.low)
            .max((bar.high - prev_close).abs())
            .max((bar.low - prev_close).abs());
        sum += tr;
    }
    Ok(sum / Decimal::from(period as u64))
}

//! Bollinger bands over a close series.

use rust_decimal::{Decimal, MathematicalOps};

use super::IndicatorError;

/// Bollinger band values for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bands {
    pub lower: Decimal,
    pub middle: Decimal,
    pub upper: Decimal,
    /// Population standard deviation of the window.
    pub stddev: Decimal,
}

impl Bands {
    /// Band width (upper - lower).
    pub fn width(&self) -> Decimal {
        self.upper - self.lower
    }
}

/// Compute Bollinger bands over the last `period` closes.
///
/// Middle band is the simple moving average; the outer bands sit
/// `stddev_mult` population standard deviations away.
pub fn bollinger(
    closes: &[Decimal],
    period: usize,
    stddev_mult: Decimal,
) -> Result<Bands, IndicatorError> {
    if closes.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            got: closes.len(),
        });
    }

    let window = &closes[closes.len() - period..];
    let n = Decimal::from(period as u64);

    let sum: Decimal = window.iter().copied().sum();
    let middle = sum / n;

    let sq_sum: Decimal = window
        .iter()
        .map(|c| {
            let d = *c - middle;
            d * d
        })
        .sum();
    let variance = sq_sum / n;
    // Variance is non-negative, so sqrt never fails here.
    let stddev = variance.sqrt().unwrap_or(Decimal::ZERO);

    let half_width = stddev_mult * stddev;
    Ok(Bands {
        lower: middle - half_width,
        middle,
        upper: middle + half_width,
        stddev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_constant_series_collapses_bands() {
        // Zero variance: upper == middle == lower == the price.
        let closes = vec![dec!(78000); 20];
        let bands = bollinger(&closes, 20, dec!(2.0)).unwrap();
        assert_eq!(bands.middle, dec!(78000));
        assert_eq!(bands.upper, dec!(78000));
        assert_eq!(bands.lower, dec!(78000));
        assert_eq!(bands.stddev, dec!(0));
        assert_eq!(bands.width(), dec!(0));
    }

    #[test]
    fn test_known_small_window() {
        // Window [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population stddev 2.
        let closes = vec![
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        let bands = bollinger(&closes, 8, dec!(2.0)).unwrap();
        assert_eq!(bands.middle, dec!(5));
        // sqrt is iterative; pin the result to a dozen places.
        assert_eq!(bands.stddev.round_dp(12), dec!(2));
        assert_eq!(bands.upper.round_dp(12), dec!(9));
        assert_eq!(bands.lower.round_dp(12), dec!(1));
    }

    #[test]
    fn test_only_last_period_counted() {
        // An extreme leading value outside the window must not matter.
        let mut closes = vec![dec!(1000000)];
        closes.extend(vec![dec!(50); 20]);
        let bands = bollinger(&closes, 20, dec!(2.0)).unwrap();
        assert_eq!(bands.middle, dec!(50));
        assert_eq!(bands.stddev, dec!(0));
    }

    #[test]
    fn test_insufficient_data() {
        let closes = vec![dec!(100); 19];
        let err = bollinger(&closes, 20, dec!(2.0)).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 20,
                got: 19
            }
        );
    }
}

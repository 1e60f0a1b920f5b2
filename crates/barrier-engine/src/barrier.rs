//! The four pass/fail conditions gating a trade signal.
//!
//! Each condition yields a [`BarrierResult`] with the measured value, the
//! threshold it was held against, and a human-readable detail line. All
//! four are computed unconditionally every tick so a full result set is
//! always available for display, even when an early condition fails.

use barrier_common::Direction;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::indicators::{Bands, BookPressure};

/// The fixed set of conditions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierKind {
    /// Target sits far enough from the rolling mean, in standard deviations.
    Statistical,
    /// Volatility-scaled drift cannot close the gap in the remaining time.
    Kinetic,
    /// Order-book depth defends the thesis side.
    Physical,
    /// Share price sits in the acceptable implied-probability band.
    RiskReward,
}

impl BarrierKind {
    /// All four conditions in their fixed order.
    pub const ALL: [BarrierKind; 4] = [
        BarrierKind::Statistical,
        BarrierKind::Kinetic,
        BarrierKind::Physical,
        BarrierKind::RiskReward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BarrierKind::Statistical => "Statistical",
            BarrierKind::Kinetic => "Kinetic",
            BarrierKind::Physical => "Physical",
            BarrierKind::RiskReward => "Risk/Reward",
        }
    }
}

impl std::fmt::Display for BarrierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one condition for one tick. Produced fresh every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierResult {
    pub barrier: BarrierKind,
    pub passed: bool,
    pub measured: Decimal,
    pub threshold: Decimal,
    pub detail: String,
}

/// Thresholds for the four conditions.
#[derive(Debug, Clone, Copy)]
pub struct BarrierThresholds {
    /// Standard deviations the target must sit from the rolling mean.
    pub stddev_mult: Decimal,
    /// Scale applied to `atr * minutes_left` for the reachable-move bound.
    pub atr_multiplier: Decimal,
    /// Minimum support/threat depth ratio.
    pub min_book_ratio: Decimal,
    /// Inclusive share price bounds.
    pub min_share_price: Decimal,
    pub max_share_price: Decimal,
}

impl Default for BarrierThresholds {
    fn default() -> Self {
        Self {
            stddev_mult: dec!(2.0),
            atr_multiplier: dec!(1.5),
            min_book_ratio: dec!(1.5),
            min_share_price: dec!(0.60),
            max_share_price: dec!(0.85),
        }
    }
}

/// Everything one evaluation tick needs, already fetched and computed.
#[derive(Debug, Clone)]
pub struct BarrierContext {
    pub target_price: Decimal,
    pub current_price: Decimal,
    pub direction: Direction,
    /// Fractional minutes until settlement.
    pub minutes_left: Decimal,
    /// Best ask for the share backing the thesis.
    pub share_price: Decimal,
    pub bands: Bands,
    pub atr: Decimal,
    pub pressure: BookPressure,
}

/// Applies the four barrier rules to one tick's context.
#[derive(Debug, Clone, Default)]
pub struct BarrierEvaluator {
    thresholds: BarrierThresholds,
}

impl BarrierEvaluator {
    pub fn new(thresholds: BarrierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BarrierThresholds {
        &self.thresholds
    }

    /// Evaluate all four conditions. No short-circuit.
    pub fn evaluate(&self, ctx: &BarrierContext) -> [BarrierResult; 4] {
        [
            self.statistical(ctx),
            self.kinetic(ctx),
            self.physical(ctx),
            self.risk_reward(ctx),
        ]
    }

    /// Statistical barrier: the target must sit at least `stddev_mult`
    /// standard deviations from the rolling mean, regardless of side.
    fn statistical(&self, ctx: &BarrierContext) -> BarrierResult {
        let bands = &ctx.bands;
        let distance = (ctx.target_price - bands.middle).abs();
        let threshold = self.thresholds.stddev_mult * bands.stddev;
        BarrierResult {
            barrier: BarrierKind::Statistical,
            passed: distance >= threshold,
            measured: distance,
            threshold,
            detail: format!(
                "bands {:.2}/{:.2}/{:.2} (lo/mid/up), |target - mid| = {:.2} vs {} x sigma = {:.2}",
                bands.lower,
                bands.middle,
                bands.upper,
                distance,
                self.thresholds.stddev_mult,
                threshold,
            ),
        }
    }

    /// Kinetic barrier: ordinary volatility-scaled drift must be unable to
    /// carry price across the gap before settlement. A target close enough
    /// that random drift alone could flip the outcome fails here.
    fn kinetic(&self, ctx: &BarrierContext) -> BarrierResult {
        let max_move = ctx.atr * ctx.minutes_left * self.thresholds.atr_multiplier;
        let distance = (ctx.target_price - ctx.current_price).abs();
        BarrierResult {
            barrier: BarrierKind::Kinetic,
            passed: distance > max_move,
            measured: distance,
            threshold: max_move,
            detail: format!(
                "gap {:.2} vs reachable {:.2} (atr {:.2} x {:.2}min x {})",
                distance, max_move, ctx.atr, ctx.minutes_left, self.thresholds.atr_multiplier,
            ),
        }
    }

    /// Physical barrier: depth within the volatility band must favor the
    /// thesis side by at least the configured ratio.
    fn physical(&self, ctx: &BarrierContext) -> BarrierResult {
        let p = &ctx.pressure;
        let detail = if p.ratio == Decimal::MAX {
            format!(
                "{}: support {:.2}, threat side empty -> unopposed",
                ctx.direction, p.support,
            )
        } else {
            format!(
                "{}: support {:.2} / threat {:.2} = {:.2}",
                ctx.direction, p.support, p.threat, p.ratio,
            )
        };
        BarrierResult {
            barrier: BarrierKind::Physical,
            passed: p.ratio >= self.thresholds.min_book_ratio,
            measured: p.ratio,
            threshold: self.thresholds.min_book_ratio,
            detail,
        }
    }

    /// Risk/reward filter: the share must cost between the inclusive bounds,
    /// pricing in enough probability without destroying the payout.
    fn risk_reward(&self, ctx: &BarrierContext) -> BarrierResult {
        let t = &self.thresholds;
        BarrierResult {
            barrier: BarrierKind::RiskReward,
            passed: ctx.share_price >= t.min_share_price && ctx.share_price <= t.max_share_price,
            measured: ctx.share_price,
            threshold: t.min_share_price,
            detail: format!(
                "share {:.2} in [{:.2}, {:.2}]",
                ctx.share_price, t.min_share_price, t.max_share_price,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bands(lower: Decimal, middle: Decimal, upper: Decimal, stddev: Decimal) -> Bands {
        Bands {
            lower,
            middle,
            upper,
            stddev,
        }
    }

    fn ctx() -> BarrierContext {
        BarrierContext {
            target_price: dec!(78063.85),
            current_price: dec!(78100.50),
            direction: Direction::Up,
            minutes_left: dec!(3.2),
            share_price: dec!(0.72),
            bands: bands(dec!(77900), dec!(78050), dec!(78200), dec!(75)),
            atr: dec!(45.50),
            pressure: BookPressure {
                support: dec!(300),
                threat: dec!(100),
                ratio: dec!(3),
            },
        }
    }

    #[test]
    fn test_results_fixed_order_and_names() {
        let results = BarrierEvaluator::default().evaluate(&ctx());
        let kinds: Vec<BarrierKind> = results.iter().map(|r| r.barrier).collect();
        assert_eq!(kinds, BarrierKind::ALL.to_vec());
        assert_eq!(results[0].barrier.as_str(), "Statistical");
        assert_eq!(results[3].barrier.as_str(), "Risk/Reward");
    }

    #[test]
    fn test_statistical_distance_from_mean() {
        let eval = BarrierEvaluator::default();
        let mut c = ctx();
        // |78063.85 - 78050| = 13.85 < 2 * 75 = 150 -> fail
        let r = eval.evaluate(&c);
        assert!(!r[0].passed);
        assert_eq!(r[0].measured, dec!(13.85));
        assert_eq!(r[0].threshold, dec!(150));
        assert!(r[0].detail.contains("77900"));

        // Push the target 2 sigma away -> pass (inclusive at the edge).
        c.target_price = dec!(78200);
        let r = eval.evaluate(&c);
        assert!(r[0].passed);
        assert_eq!(r[0].measured, dec!(150));
    }

    #[test]
    fn test_statistical_collapsed_bands_always_pass() {
        // Zero variance: any target distance >= 0 holds.
        let mut c = ctx();
        c.bands = bands(dec!(78000), dec!(78000), dec!(78000), dec!(0));
        c.target_price = dec!(78000);
        let r = BarrierEvaluator::default().evaluate(&c);
        assert!(r[0].passed);
    }

    #[test]
    fn test_kinetic_documented_example() {
        // atr=45.50, minutes=3.2 -> reachable = 45.50 * 3.2 * 1.5 = 218.40;
        // gap |78063.85 - 78100.50| = 36.65 -> fails.
        let r = BarrierEvaluator::default().evaluate(&ctx());
        assert!(!r[1].passed);
        assert_eq!(r[1].threshold, dec!(218.400));
        assert_eq!(r[1].measured, dec!(36.65));
    }

    #[test]
    fn test_kinetic_far_target_passes() {
        let mut c = ctx();
        c.target_price = dec!(77800); // gap 300.50 > 218.40
        let r = BarrierEvaluator::default().evaluate(&c);
        assert!(r[1].passed);
    }

    #[test]
    fn test_kinetic_boundary_is_strict() {
        let mut c = ctx();
        c.target_price = c.current_price - dec!(218.400); // gap == reachable
        let r = BarrierEvaluator::default().evaluate(&c);
        assert!(!r[1].passed);
    }

    #[test]
    fn test_physical_threshold() {
        let eval = BarrierEvaluator::default();
        let mut c = ctx();
        c.pressure.ratio = dec!(1.5);
        assert!(eval.evaluate(&c)[2].passed);
        c.pressure.ratio = dec!(1.49);
        assert!(!eval.evaluate(&c)[2].passed);
    }

    #[test]
    fn test_physical_sentinel_passes() {
        let mut c = ctx();
        c.pressure = BookPressure {
            support: dec!(50),
            threat: dec!(0),
            ratio: Decimal::MAX,
        };
        let r = BarrierEvaluator::default().evaluate(&c);
        assert!(r[2].passed);
        assert!(r[2].detail.contains("unopposed"));
    }

    #[test]
    fn test_risk_reward_inclusive_bounds() {
        let eval = BarrierEvaluator::default();
        let mut c = ctx();
        for (price, expect) in [
            (dec!(0.60), true),
            (dec!(0.85), true),
            (dec!(0.599), false),
            (dec!(0.851), false),
        ] {
            c.share_price = price;
            assert_eq!(eval.evaluate(&c)[3].passed, expect, "share price {}", price);
        }
    }
}

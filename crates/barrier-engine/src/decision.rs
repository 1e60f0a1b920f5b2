//! Aggregation of the four condition results into a `Decision`.

use barrier_common::{Direction, Outcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::barrier::BarrierResult;

/// One tick's full verdict: four conditions plus the all-pass signal.
///
/// Invariant: `signal` is true if and only if every condition passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub timestamp: DateTime<Utc>,
    /// Fixed order: Statistical, Kinetic, Physical, Risk/Reward.
    pub conditions: [BarrierResult; 4],
    pub signal: bool,
    /// Thesis at the time of this tick.
    pub direction: Direction,
    /// Share side a passing signal recommends buying.
    pub recommended_side: Outcome,
    /// Best ask for that share when evaluated.
    pub share_price: Decimal,
}

impl Decision {
    /// Number of conditions that passed (for display).
    pub fn passed_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.passed).count()
    }
}

/// Combine four condition results into a decision.
///
/// Pure and side-effect-free; the window state machine decides *when*
/// this runs, never this function.
pub fn aggregate(
    timestamp: DateTime<Utc>,
    conditions: [BarrierResult; 4],
    direction: Direction,
    share_price: Decimal,
) -> Decision {
    let signal = conditions.iter().all(|c| c.passed);
    Decision {
        timestamp,
        conditions,
        signal,
        direction,
        recommended_side: direction.outcome(),
        share_price,
    }
}

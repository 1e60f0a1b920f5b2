//! Settlement classification for a finished window.

use barrier_common::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Final verdict for one market window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The recommended direction realized.
    Win {
        direction: Direction,
        entry_price: Decimal,
        settlement_price: Decimal,
    },
    /// The recommended direction did not realize.
    Loss {
        direction: Direction,
        entry_price: Decimal,
        settlement_price: Decimal,
    },
    /// No tick ever had all four conditions pass.
    NoSignalIssued { settlement_price: Decimal },
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Win { .. } => "WIN",
            Verdict::Loss { .. } => "LOSS",
            Verdict::NoSignalIssued { .. } => "NO_SIGNAL_ISSUED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify the window given the settlement price and the first passing
/// decision, if any occurred.
///
/// UP realizes only strictly above the strike, DOWN only strictly below;
/// settlement exactly at the strike is a loss for either side.
pub fn judge(strike_price: Decimal, settlement_price: Decimal, first_signal: Option<&Decision>) -> Verdict {
    let decision = match first_signal {
        Some(d) => d,
        None => return Verdict::NoSignalIssued { settlement_price },
    };

    let realized = match decision.direction {
        Direction::Up => settlement_price > strike_price,
        Direction::Down => settlement_price < strike_price,
    };

    if realized {
        Verdict::Win {
            direction: decision.direction,
            entry_price: decision.share_price,
            settlement_price,
        }
    } else {
        Verdict::Loss {
            direction: decision.direction,
            entry_price: decision.share_price,
            settlement_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::{BarrierKind, BarrierResult};
    use crate::decision::aggregate;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn passing_decision(direction: Direction) -> Decision {
        let conditions = BarrierKind::ALL.map(|kind| BarrierResult {
            barrier: kind,
            passed: true,
            measured: dec!(1),
            threshold: dec!(1),
            detail: String::new(),
        });
        aggregate(Utc::now(), conditions, direction, dec!(0.70))
    }

    #[test]
    fn test_no_signal_issued() {
        let v = judge(dec!(100000), dec!(100500), None);
        assert_eq!(
            v,
            Verdict::NoSignalIssued {
                settlement_price: dec!(100500)
            }
        );
        assert_eq!(v.as_str(), "NO_SIGNAL_ISSUED");
    }

    #[test]
    fn test_up_wins_above_strike() {
        let d = passing_decision(Direction::Up);
        let v = judge(dec!(100000), dec!(100001), Some(&d));
        assert!(matches!(v, Verdict::Win { direction: Direction::Up, .. }));
    }

    #[test]
    fn test_up_loses_below_strike() {
        let d = passing_decision(Direction::Up);
        let v = judge(dec!(100000), dec!(99999), Some(&d));
        assert!(matches!(v, Verdict::Loss { .. }));
    }

    #[test]
    fn test_down_wins_below_strike() {
        let d = passing_decision(Direction::Down);
        let v = judge(dec!(100000), dec!(99000), Some(&d));
        assert!(matches!(v, Verdict::Win { direction: Direction::Down, .. }));
    }

    #[test]
    fn test_exact_strike_is_loss_for_both_sides() {
        for direction in [Direction::Up, Direction::Down] {
            let d = passing_decision(direction);
            let v = judge(dec!(100000), dec!(100000), Some(&d));
            assert!(matches!(v, Verdict::Loss { .. }), "{} at strike", direction);
        }
    }

    #[test]
    fn test_verdict_carries_entry_price() {
        let d = passing_decision(Direction::Up);
        match judge(dec!(100000), dec!(100500), Some(&d)) {
            Verdict::Win { entry_price, settlement_price, .. } => {
                assert_eq!(entry_price, dec!(0.70));
                assert_eq!(settlement_price, dec!(100500));
            }
            other => panic!("expected Win, got {:?}", other),
        }
    }
}

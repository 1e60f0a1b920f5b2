//! Order-book depth banding and support/threat pressure.

use barrier_common::{BookLevel, Direction};
use rust_decimal::Decimal;

/// Support vs threat volume for the current thesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookPressure {
    /// Volume on the side defending the thesis.
    pub support: Decimal,
    /// Volume on the side that would push price toward the strike.
    pub threat: Decimal,
    /// `support / threat`. `Decimal::MAX` when the threat side is empty.
    pub ratio: Decimal,
}

/// Aggregate size of levels strictly inside `(low, high)`.
///
/// Only depth within the immediate volatility range matters; walls far
/// from the current price cannot act within the remaining window.
pub fn depth_within(levels: &[BookLevel], low: Decimal, high: Decimal) -> Decimal {
    levels
        .iter()
        .filter(|l| l.price > low && l.price < high)
        .map(|l| l.size)
        .sum()
}

/// Classify banded ask/bid volume into support and threat for `direction`.
///
/// For an UP thesis the bid cushion below price is support and the asks
/// overhead are the threat; for DOWN the roles swap. An empty threat side
/// yields the `Decimal::MAX` sentinel rather than a division fault, and is
/// treated as a pass downstream.
pub fn book_pressure(
    ask_volume: Decimal,
    bid_volume: Decimal,
    direction: Direction,
) -> BookPressure {
    let (support, threat) = match direction {
        Direction::Up => (bid_volume, ask_volume),
        Direction::Down => (ask_volume, bid_volume),
    };
    let ratio = if threat.is_zero() {
        Decimal::MAX
    } else {
        support / threat
    };
    BookPressure {
        support,
        threat,
        ratio,
    }
}

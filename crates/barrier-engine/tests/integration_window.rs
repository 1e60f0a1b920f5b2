//! Integration test: a full scripted market window driven through the
//! engine, from discovery hand-off to the settlement verdict, with no
//! network I/O.

use barrier_common::{BookLevel, Candle, CryptoAsset, MarketWindow, Outcome, OutcomeQuotes};
use barrier_engine::config::EngineConfig;
use barrier_engine::engine::BarrierEngine;
use barrier_engine::feed::{TickSnapshot, TickSource, VecTickSource};
use barrier_engine::judge::Verdict;
use barrier_engine::window::{Advance, WindowState};
use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn market() -> MarketWindow {
    MarketWindow {
        market_id: "btc-updown-15m-1767268800".to_string(),
        asset: CryptoAsset::Btc,
        yes_token_id: "yes-token".to_string(),
        no_token_id: "no-token".to_string(),
        strike_price: dec!(100000),
        window_start: ts("2026-01-01T12:00:00Z"),
        window_end: ts("2026-01-01T12:15:00Z"),
        discovered_at: ts("2026-01-01T12:00:10Z"),
    }
}

/// Sixty 1-minute candles oscillating +/-5 around 100500, ending at
/// 100495. Population stddev of the closes is 5 and every true range is
/// 15, so the indicator values are exact and easy to reason about.
fn oscillating_candles() -> Vec<Candle> {
    (0..60)
        .map(|i| {
            let close = if i % 2 == 0 { dec!(100505) } else { dec!(100495) };
            Candle {
                open_time: ts("2026-01-01T11:00:00Z") + Duration::minutes(i),
                open: close,
                high: close + dec!(5),
                low: close - dec!(5),
                close,
                volume: dec!(1),
            }
        })
        .collect()
}

/// A realistic snapshot where all four conditions pass for an UP thesis:
/// spot sits 495 above the strike (far outside both the 2-sigma distance
/// and the ATR-reachable move), the bid cushion outweighs the ask roof
/// 3:1 inside the ATR band, and the UP share costs 0.72.
fn passing_snapshot(fetched_at: DateTime<Utc>) -> TickSnapshot {
    TickSnapshot {
        fetched_at,
        spot_price: dec!(100495),
        candles: oscillating_candles(),
        bids: vec![
            BookLevel::new(dec!(100490), dec!(30)),
            // Outside the ATR band; must be ignored.
            BookLevel::new(dec!(100000), dec!(5000)),
        ],
        asks: vec![
            BookLevel::new(dec!(100500), dec!(10)),
            BookLevel::new(dec!(101000), dec!(5000)),
        ],
        quotes: OutcomeQuotes {
            up: Some(dec!(0.72)),
            down: Some(dec!(0.30)),
        },
    }
}

fn blocked_snapshot(fetched_at: DateTime<Utc>) -> TickSnapshot {
    let mut snapshot = passing_snapshot(fetched_at);
    // Share too expensive: risk/reward fails, the other three still pass.
    snapshot.quotes.up = Some(dec!(0.92));
    snapshot
}

#[tokio::test]
async fn test_window_with_signal_resolves_to_win() {
    let config = EngineConfig::default();
    let mut engine = BarrierEngine::new(market(), &config, ts("2026-01-01T12:00:10Z")).unwrap();

    // Tick at T-5.5min: still waiting, evaluator must not run.
    let t = ts("2026-01-01T12:09:30Z");
    assert_eq!(engine.advance(t), Advance::Held);
    assert_eq!(engine.state(), WindowState::WaitingForWindow);
    assert!(!engine.is_evaluating());

    // Tick at T-4.5min: entry gate satisfied.
    let t = ts("2026-01-01T12:10:30Z");
    assert_eq!(engine.advance(t), Advance::Entered);
    assert!(engine.is_evaluating());

    let mut source = VecTickSource::new(vec![
        blocked_snapshot(t),
        passing_snapshot(ts("2026-01-01T12:11:30Z")),
        passing_snapshot(ts("2026-01-01T12:12:30Z")),
    ]);

    // First evaluation: 3/4 conditions, no signal yet.
    let snapshot = source.next_tick(engine.market()).await.unwrap();
    let decision = engine.evaluate(t, &snapshot).unwrap();
    assert!(!decision.signal);
    assert_eq!(decision.passed_count(), 3);
    assert!(engine.first_signal().is_none());

    // Second evaluation at T-3.5min: all four pass.
    let t = ts("2026-01-01T12:11:30Z");
    assert_eq!(engine.advance(t), Advance::Held);
    let snapshot = source.next_tick(engine.market()).await.unwrap();
    let decision = engine.evaluate(t, &snapshot).unwrap();
    assert!(decision.signal);
    assert_eq!(decision.recommended_side, Outcome::Yes);
    assert_eq!(decision.share_price, dec!(0.72));
    let first_ts = engine.first_signal().unwrap().timestamp;
    assert_eq!(first_ts, t);

    // Third evaluation below the 3-minute entry bound: evaluation
    // continues once inside, and the first-signal memo is not rewritten.
    let t = ts("2026-01-01T12:12:30Z");
    assert_eq!(engine.advance(t), Advance::Held);
    assert!(engine.is_evaluating());
    let snapshot = source.next_tick(engine.market()).await.unwrap();
    let decision = engine.evaluate(t, &snapshot).unwrap();
    assert!(decision.signal);
    assert_eq!(engine.first_signal().unwrap().timestamp, first_ts);

    // Expiry is reported exactly once.
    let t = ts("2026-01-01T12:15:01Z");
    assert_eq!(engine.advance(t), Advance::Expired);
    assert_eq!(engine.advance(t), Advance::Held);
    assert_eq!(engine.state(), WindowState::Expired);

    // Settlement above the strike: the UP recommendation realized.
    match engine.finish(dec!(100700)) {
        Verdict::Win {
            entry_price,
            settlement_price,
            ..
        } => {
            assert_eq!(entry_price, dec!(0.72));
            assert_eq!(settlement_price, dec!(100700));
        }
        other => panic!("expected Win, got {:?}", other),
    }
}

#[tokio::test]
async fn test_window_without_signal_reports_no_signal_issued() {
    let config = EngineConfig::default();
    let mut engine = BarrierEngine::new(market(), &config, ts("2026-01-01T12:00:10Z")).unwrap();

    let t = ts("2026-01-01T12:10:30Z");
    assert_eq!(engine.advance(t), Advance::Entered);

    let mut source = VecTickSource::new(vec![blocked_snapshot(t)]);
    let snapshot = source.next_tick(engine.market()).await.unwrap();
    let decision = engine.evaluate(t, &snapshot).unwrap();
    assert!(!decision.signal);

    assert_eq!(engine.advance(ts("2026-01-01T12:15:01Z")), Advance::Expired);
    assert_eq!(
        engine.finish(dec!(100700)),
        Verdict::NoSignalIssued {
            settlement_price: dec!(100700)
        }
    );
}

#[tokio::test]
async fn test_recoverable_skip_then_signal_on_next_tick() {
    let config = EngineConfig::default();
    let mut engine = BarrierEngine::new(market(), &config, ts("2026-01-01T12:00:10Z")).unwrap();

    let t = ts("2026-01-01T12:10:30Z");
    assert_eq!(engine.advance(t), Advance::Entered);

    // First snapshot is short on candles: the tick is skipped with all
    // conditions indeterminate, nothing is recorded.
    let mut short = passing_snapshot(t);
    short.candles.truncate(5);
    let err = engine.evaluate(t, &short).unwrap_err();
    assert!(err.is_recoverable());
    assert!(engine.latest().is_none());

    // The next tick recovers.
    let t = ts("2026-01-01T12:11:00Z");
    let decision = engine.evaluate(t, &passing_snapshot(t)).unwrap();
    assert!(decision.signal);
}

#[tokio::test]
async fn test_missed_entry_gate_never_evaluates() {
    let config = EngineConfig::default();
    let mut engine = BarrierEngine::new(market(), &config, ts("2026-01-01T12:00:10Z")).unwrap();

    // First tick arrives below the 3-minute bound: gate missed for good.
    let t = ts("2026-01-01T12:12:45Z");
    assert_eq!(engine.advance(t), Advance::Held);
    assert_eq!(engine.state(), WindowState::WaitingForWindow);
    assert!(!engine.is_evaluating());

    assert_eq!(engine.advance(ts("2026-01-01T12:15:00Z")), Advance::Expired);
    assert!(matches!(
        engine.finish(dec!(99000)),
        Verdict::NoSignalIssued { .. }
    ));
}

#[tokio::test]
async fn test_kinetic_barrier_blocks_near_strike() {
    // Spot only 30 above the strike: ATR 15 over ~4.5 minutes reaches
    // 101.25, so the kinetic barrier must fail while the others pass.
    let config = EngineConfig::default();
    let mut market = market();
    market.strike_price = dec!(100465);
    let mut engine = BarrierEngine::new(market, &config, ts("2026-01-01T12:00:10Z")).unwrap();

    let t = ts("2026-01-01T12:10:30Z");
    assert_eq!(engine.advance(t), Advance::Entered);

    let decision = engine.evaluate(t, &passing_snapshot(t)).unwrap();
    assert!(!decision.signal);
    let kinetic = &decision.conditions[1];
    assert!(!kinetic.passed);
    assert_eq!(kinetic.measured, dec!(30));
    // 15 * 4.5 * 1.5 = 101.25
    assert_eq!(kinetic.threshold, dec!(101.250));
}

#[tokio::test]
async fn test_statistical_distance_exact_values() {
    // Strike 100000 vs middle band 100500: distance 500, threshold
    // 2 sigma = 10 with the oscillating series.
    let config = EngineConfig::default();
    let mut engine = BarrierEngine::new(market(), &config, ts("2026-01-01T12:00:10Z")).unwrap();

    let t = ts("2026-01-01T12:10:30Z");
    engine.advance(t);
    let decision = engine.evaluate(t, &passing_snapshot(t)).unwrap();

    let statistical = &decision.conditions[0];
    assert!(statistical.passed);
    assert_eq!(statistical.measured, dec!(500));
    assert_eq!(statistical.threshold.round_dp(10), dec!(10));

    let physical = &decision.conditions[2];
    assert!(physical.passed);
    // 30 support / 10 threat within the ATR band; the distant walls on
    // both sides are excluded.
    assert_eq!(physical.measured, dec!(3));
}

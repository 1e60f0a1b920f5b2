//! Continuous live monitor loop.
//!
//! One market window at a time: discover the active market, drive the
//! engine on a fixed tick cadence, judge the outcome at settlement, then
//! move on to the next window. Purely advisory: decisions and verdicts are
//! emitted as structured log events, nothing is ever executed.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use barrier_market::{BinanceClient, MarketDiscovery, OracleClient};

use crate::config::EngineConfig;
use crate::decision::Decision;
use crate::engine::BarrierEngine;
use crate::feed::live::LiveTickSource;
use crate::feed::TickSource;
use crate::judge::Verdict;
use crate::window::Advance;

/// Running tally for the monitoring session. In-memory only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStats {
    pub markets: u64,
    pub signals: u64,
    pub wins: u64,
    pub losses: u64,
}

impl SessionStats {
    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Win { .. } => {
                self.signals += 1;
                self.wins += 1;
            }
            Verdict::Loss { .. } => {
                self.signals += 1;
                self.losses += 1;
            }
            Verdict::NoSignalIssued { .. } => {}
        }
    }

    fn log(&self) {
        info!(
            markets = self.markets,
            signals = self.signals,
            wins = self.wins,
            losses = self.losses,
            "Session stats"
        );
    }
}

/// Why one window's loop returned.
enum WindowExit {
    Settled,
    Shutdown,
}

/// Run the monitor until shutdown is requested.
pub async fn run_monitor(config: EngineConfig, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let discovery = MarketDiscovery::new(http.clone(), config.window_duration);
    let oracle = OracleClient::new(http.clone());
    let binance = BinanceClient::new(http.clone());
    let mut source = LiveTickSource::new(http, config.monitor.candle_lookback);
    let mut stats = SessionStats::default();

    let next_market_wait = Duration::from_secs(config.monitor.next_market_wait_secs);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Utc::now();
        let market = match discovery.current_market(config.asset, now).await {
            Ok(market) => market,
            Err(e) => {
                warn!("Market discovery failed: {}. Retrying shortly.", e);
                if wait_or_shutdown(&mut shutdown, next_market_wait).await {
                    break;
                }
                continue;
            }
        };

        let mut engine = match BarrierEngine::new(market, &config, Utc::now()) {
            Ok(engine) => engine,
            Err(e) => {
                // InvalidWindow: discovery raced the boundary; the next
                // lookup lands in the fresh window.
                warn!("Rejecting market: {}", e);
                if wait_or_shutdown(&mut shutdown, next_market_wait).await {
                    break;
                }
                continue;
            }
        };

        stats.markets += 1;
        info!(
            market = %engine.market().market_id,
            strike = %engine.market().strike_price,
            minutes_left = %engine.minutes_remaining(Utc::now()).round_dp(2),
            "Monitoring market"
        );

        let exit = run_window(&mut engine, &mut source, &config, &mut shutdown).await;

        match exit {
            WindowExit::Settled => {
                if let Some(verdict) = settle(&engine, &oracle, &binance, &config).await {
                    stats.record(&verdict);
                    log_verdict(&engine, &verdict);
                }
                stats.log();
            }
            WindowExit::Shutdown => break,
        }

        if wait_or_shutdown(&mut shutdown, next_market_wait).await {
            break;
        }
    }

    info!("Monitor stopped");
    stats.log();
    Ok(())
}

/// Drive one market window to settlement (or shutdown).
async fn run_window(
    engine: &mut BarrierEngine,
    source: &mut LiveTickSource,
    config: &EngineConfig,
    shutdown: &mut watch::Receiver<bool>,
) -> WindowExit {
    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.monitor.poll_interval_secs));

    loop {
        tokio::select! {
            _ = shutdown.changed() => return WindowExit::Shutdown,
            _ = ticker.tick() => {}
        }

        let now = Utc::now();
        let minutes_left = engine.minutes_remaining(now).round_dp(2);

        match engine.advance(now) {
            Advance::Entered => {
                info!(%minutes_left, "Entered execution window");
            }
            Advance::Expired => {
                info!(market = %engine.market().market_id, "Window expired");
                return WindowExit::Settled;
            }
            Advance::Held => {}
        }

        if !engine.is_evaluating() {
            debug!(%minutes_left, state = %engine.state(), "Waiting");
            continue;
        }

        let snapshot = match source.next_tick(engine.market()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%minutes_left, "Feed error, skipping tick: {}", e);
                continue;
            }
        };

        match engine.evaluate(Utc::now(), &snapshot) {
            Ok(decision) => log_decision(&decision, minutes_left),
            // Every per-tick failure is recoverable: the conditions are
            // indeterminate this tick, not failed.
            Err(e) => warn!(%minutes_left, "Skipping tick: {}", e),
        }
    }
}

/// Fetch the settlement price and run the judge.
///
/// The event-page oracle is authoritative; the exchange spot is only a
/// fallback when the page never populates. Returns `None` when no
/// settlement price could be obtained at all.
async fn settle(
    engine: &BarrierEngine,
    oracle: &OracleClient,
    binance: &BinanceClient,
    config: &EngineConfig,
) -> Option<Verdict> {
    let market = engine.market();

    let settlement = match oracle
        .close_price(market.asset, config.window_duration, market.window_start)
        .await
    {
        Ok(Some(price)) => Some(price),
        Ok(None) => None,
        Err(e) => {
            warn!("Oracle settlement fetch failed: {}", e);
            None
        }
    };

    let settlement = match settlement {
        Some(price) => price,
        None => match binance.spot_price(market.asset).await {
            Ok(price) => {
                warn!("Oracle price unavailable, judging against exchange spot {}", price);
                price
            }
            Err(e) => {
                warn!("Settlement price unavailable, skipping resolution: {}", e);
                return None;
            }
        },
    };

    Some(engine.finish(settlement))
}

fn log_decision(decision: &Decision, minutes_left: Decimal) {
    for c in &decision.conditions {
        info!(
            %minutes_left,
            barrier = c.barrier.as_str(),
            passed = c.passed,
            measured = %c.measured.round_dp(4),
            threshold = %c.threshold.round_dp(4),
            detail = %c.detail,
            "Condition"
        );
    }
    if decision.signal {
        info!(
            %minutes_left,
            direction = %decision.direction,
            side = %decision.recommended_side,
            share_price = %decision.share_price,
            "SIGNAL: all four conditions passed"
        );
    } else {
        info!(
            %minutes_left,
            passed = decision.passed_count(),
            direction = %decision.direction,
            "No signal ({}/4 conditions)",
            decision.passed_count()
        );
    }
}

fn log_verdict(engine: &BarrierEngine, verdict: &Verdict) {
    let market = engine.market();
    match verdict {
        Verdict::Win {
            direction,
            entry_price,
            settlement_price,
        }
        | Verdict::Loss {
            direction,
            entry_price,
            settlement_price,
        } => {
            info!(
                market = %market.market_id,
                strike = %market.strike_price,
                settlement = %settlement_price,
                direction = %direction,
                entry_price = %entry_price,
                verdict = verdict.as_str(),
                "Window resolved"
            );
        }
        Verdict::NoSignalIssued { settlement_price } => {
            info!(
                market = %market.market_id,
                strike = %market.strike_price,
                settlement = %settlement_price,
                verdict = verdict.as_str(),
                "Window resolved without a signal"
            );
        }
    }
}

/// Sleep for `duration`, returning true if shutdown arrived first.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = shutdown.changed() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

//! Per-window tick orchestration.
//!
//! One [`BarrierEngine`] is created per discovered market window and
//! discarded after the judge has run. Each tick's decision depends only on
//! that tick's snapshot; the only memo carried across ticks is the first
//! passing decision, written at most once per window for the outcome judge.

use barrier_common::{Direction, MarketWindow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::barrier::{BarrierContext, BarrierEvaluator};
use crate::config::{EngineConfig, IndicatorConfig};
use crate::decision::{aggregate, Decision};
use crate::feed::TickSnapshot;
use crate::indicators::{self, IndicatorError};
use crate::judge::{judge, Verdict};
use crate::window::{Advance, WindowState, WindowStateMachine};

/// Errors raised by the engine. All but `InvalidWindow` are per-tick and
/// recoverable: skip the tick, retry on the next one.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error("share quote unavailable for the {side} side")]
    MissingQuote { side: Direction },

    #[error("stale input: snapshot is {age_ms}ms old, tick interval is {interval_ms}ms")]
    StaleInput { age_ms: i64, interval_ms: i64 },

    #[error("market {market_id} already expired (window end {window_end})")]
    InvalidWindow {
        market_id: String,
        window_end: DateTime<Utc>,
    },
}

impl EngineError {
    /// True when skipping the current tick and retrying is enough.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::InvalidWindow { .. })
    }
}

/// Evaluates one market window tick by tick.
#[derive(Debug)]
pub struct BarrierEngine {
    market: MarketWindow,
    machine: WindowStateMachine,
    evaluator: BarrierEvaluator,
    indicators: IndicatorConfig,
    tick_interval: chrono::Duration,
    latest: Option<Decision>,
    first_signal: Option<Decision>,
}

impl BarrierEngine {
    /// Build an engine for a freshly discovered market.
    ///
    /// Rejects a market whose settlement time has already passed.
    pub fn new(
        market: MarketWindow,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if market.is_expired(now) {
            return Err(EngineError::InvalidWindow {
                market_id: market.market_id.clone(),
                window_end: market.window_end,
            });
        }
        Ok(Self {
            machine: WindowStateMachine::new(
                config.window.entry_min_minutes,
                config.window.entry_max_minutes,
            ),
            evaluator: BarrierEvaluator::new(config.barriers),
            indicators: config.indicators.clone(),
            tick_interval: chrono::Duration::seconds(config.monitor.poll_interval_secs as i64),
            latest: None,
            first_signal: None,
            market,
        })
    }

    pub fn market(&self) -> &MarketWindow {
        &self.market
    }

    pub fn state(&self) -> WindowState {
        self.machine.state()
    }

    /// Latest decision, if any tick evaluated.
    pub fn latest(&self) -> Option<&Decision> {
        self.latest.as_ref()
    }

    /// First decision where all four conditions passed.
    pub fn first_signal(&self) -> Option<&Decision> {
        self.first_signal.as_ref()
    }

    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> Decimal {
        self.market.minutes_remaining(now)
    }

    /// Drive the window state machine for this tick.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Advance {
        self.machine.advance(self.market.minutes_remaining(now))
    }

    /// True while the evaluator should run each tick.
    pub fn is_evaluating(&self) -> bool {
        self.machine.is_evaluating()
    }

    /// Evaluate one tick against a fetched snapshot.
    ///
    /// The caller is responsible for only invoking this while the state
    /// machine is in the execution window.
    pub fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        snapshot: &TickSnapshot,
    ) -> Result<Decision, EngineError> {
        let age = now - snapshot.fetched_at;
        if age > self.tick_interval {
            return Err(EngineError::StaleInput {
                age_ms: age.num_milliseconds(),
                interval_ms: self.tick_interval.num_milliseconds(),
            });
        }

        let spot = snapshot.spot_price;
        let strike = self.market.strike_price;

        // Direction hint is recomputed every tick from spot vs strike.
        let direction = if spot > strike {
            Direction::Up
        } else {
            Direction::Down
        };

        let calibrated = indicators::calibrate(&snapshot.candles, spot);
        let closes = indicators::closes(&calibrated);

        let bands = indicators::bollinger(
            &closes,
            self.indicators.bollinger_period,
            self.indicators.bollinger_stddev_mult,
        )?;
        let atr = indicators::atr(&calibrated, self.indicators.atr_period)?;

        // Only depth within the immediate volatility range can act before
        // settlement: bids cushion below spot, asks cap above.
        let bid_volume = indicators::depth_within(&snapshot.bids, spot - atr, spot);
        let ask_volume = indicators::depth_within(&snapshot.asks, spot, spot + atr);
        let pressure = indicators::book_pressure(ask_volume, bid_volume, direction);

        let share_price = snapshot
            .quotes
            .for_direction(direction)
            .ok_or(EngineError::MissingQuote { side: direction })?;

        let ctx = BarrierContext {
            target_price: strike,
            current_price: spot,
            direction,
            minutes_left: self.market.minutes_remaining(now),
            share_price,
            bands,
            atr,
            pressure,
        };
        let conditions = self.evaluator.evaluate(&ctx);
        let decision = aggregate(now, conditions, direction, share_price);

        if decision.signal && self.first_signal.is_none() {
            self.first_signal = Some(decision.clone());
        }
        self.latest = Some(decision.clone());
        Ok(decision)
    }

    /// Run the outcome judge against the settlement price.
    pub fn finish(&self, settlement_price: Decimal) -> Verdict {
        judge(
            self.market.strike_price,
            settlement_price,
            self.first_signal.as_ref(),
        )
    }
}

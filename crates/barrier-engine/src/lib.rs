//! Barrier evaluation engine for short-lived binary-outcome markets.
//!
//! This crate implements the advisory core: four independent
//! statistical/microstructure conditions are evaluated during a narrow
//! execution window before a 15-minute market settles, and only when all
//! four pass does the engine recommend a side. It never places orders.
//!
//! ## Modules
//!
//! - `indicators`: pure indicator math (Bollinger bands, ATR, book pressure)
//! - `barrier`: the four pass/fail conditions
//! - `window`: execution-window state machine
//! - `decision`: aggregation of condition results into a `Decision`
//! - `judge`: WIN/LOSS classification at settlement
//! - `engine`: per-window tick orchestration
//! - `feed`: snapshot-per-tick source boundary (live and replay)
//! - `config`: TOML + env + CLI layered configuration
//! - `runner`: the continuous live monitor loop

pub mod barrier;
pub mod config;
pub mod decision;
pub mod engine;
pub mod feed;
pub mod indicators;
pub mod judge;
pub mod runner;
pub mod window;

pub use barrier::{BarrierEvaluator, BarrierKind, BarrierResult, BarrierThresholds};
pub use config::EngineConfig;
pub use decision::Decision;
pub use engine::{BarrierEngine, EngineError};
pub use feed::{FeedError, TickSnapshot, TickSource, VecTickSource};
pub use judge::{judge, Verdict};
pub use window::{Advance, WindowState, WindowStateMachine};

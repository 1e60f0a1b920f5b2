//! Execution-window state machine.
//!
//! One machine tracks one market's countdown:
//! `WaitingForWindow -> InWindow -> Expired`, driven only by the minutes
//! remaining. Transitions are monotonic; no state is ever revisited. A new
//! machine is created for the next window by the discovery loop.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of one market window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    /// Too early; the evaluator does not run.
    WaitingForWindow,
    /// Inside the execution window; evaluate every tick until expiry.
    InWindow,
    /// Settled; the outcome judge runs exactly once.
    Expired,
}

impl std::fmt::Display for WindowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowState::WaitingForWindow => write!(f, "WAITING_FOR_WINDOW"),
            WindowState::InWindow => write!(f, "IN_WINDOW"),
            WindowState::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// What a call to [`WindowStateMachine::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No state change this tick.
    Held,
    /// Entry gate satisfied; evaluation begins this tick.
    Entered,
    /// The window just expired; reported exactly once.
    Expired,
}

/// State machine gating when the barrier evaluator may run.
///
/// The entry gate is a closed interval `[entry_min, entry_max]` minutes
/// before settlement. The lower bound gates *entry* only: once inside,
/// evaluation continues below it all the way to expiry. A window whose
/// gate was missed entirely stays waiting and closes without a signal.
#[derive(Debug, Clone)]
pub struct WindowStateMachine {
    entry_min: Decimal,
    entry_max: Decimal,
    state: WindowState,
}

impl WindowStateMachine {
    pub fn new(entry_min: Decimal, entry_max: Decimal) -> Self {
        Self {
            entry_min,
            entry_max,
            state: WindowState::WaitingForWindow,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// True while the evaluator should run each tick.
    pub fn is_evaluating(&self) -> bool {
        self.state == WindowState::InWindow
    }

    /// Feed the current minutes-remaining into the machine.
    ///
    /// Idempotent once expired: further calls return [`Advance::Held`].
    pub fn advance(&mut self, minutes_left: Decimal) -> Advance {
        match self.state {
            WindowState::Expired => Advance::Held,
            _ if minutes_left <= Decimal::ZERO => {
                self.state = WindowState::Expired;
                Advance::Expired
            }
            WindowState::WaitingForWindow
                if minutes_left >= self.entry_min && minutes_left <= self.entry_max =>
            {
                self.state = WindowState::InWindow;
                Advance::Entered
            }
            _ => Advance::Held,
        }
    }
}

//! Vector-backed replay source for tests.

use async_trait::async_trait;
use barrier_common::MarketWindow;

use super::{FeedError, TickSnapshot, TickSource};

/// Replays a pre-built sequence of snapshots, one per tick.
///
/// Used by integration tests to drive a whole scripted window through the
/// engine without any network I/O.
#[derive(Debug, Default)]
pub struct VecTickSource {
    snapshots: std::collections::VecDeque<TickSnapshot>,
}

impl VecTickSource {
    pub fn new(snapshots: Vec<TickSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into(),
        }
    }

    /// Remaining snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl TickSource for VecTickSource {
    async fn next_tick(&mut self, _market: &MarketWindow) -> Result<TickSnapshot, FeedError> {
        self.snapshots.pop_front().ok_or(FeedError::StreamEnded)
    }
}

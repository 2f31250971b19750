//! A driver that records what it is asked to do, for tests.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use flowlight_core::BulbColor;

use crate::driver::BulbDriver;
use crate::{BulbError, Result};

/// One call made on a [`RecordingBulb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbAction {
    /// `set_color` with a visible colour.
    Color(BulbColor),
    /// `turn_off`, or `set_color(Black)`.
    Off,
}

/// An in-memory bulb that records every call.
#[derive(Debug, Default)]
pub struct RecordingBulb {
    actions: Mutex<Vec<BulbAction>>,
    failing: bool,
}

impl RecordingBulb {
    /// Create a bulb that accepts every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bulb that records each call and then fails it.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            actions: Mutex::default(),
            failing: true,
        }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn actions(&self) -> Vec<BulbAction> {
        self.actions.lock().clone()
    }

    /// Wait until at least `count` actions are recorded.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.actions.lock().len() >= count {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, action: BulbAction) -> Result<()> {
        self.actions.lock().push(action);
        if self.failing {
            Err(BulbError::Protocol("recording bulb set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BulbDriver for RecordingBulb {
    async fn set_color(&self, color: BulbColor) -> Result<()> {
        if color.is_off() {
            return self.record(BulbAction::Off);
        }
        self.record(BulbAction::Color(color))
    }

    async fn turn_off(&self) -> Result<()> {
        self.record(BulbAction::Off)
    }
}

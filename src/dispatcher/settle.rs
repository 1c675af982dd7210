//! Pause between dispatched actions
//!
//! A navigation has to finish rendering before the next action can find
//! its target element. The default waits a fixed 150ms.

use std::time::Duration;

use assistant_types::UiAction;
use async_trait::async_trait;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

#[async_trait]
pub trait SettleStrategy: Send + Sync {
    /// Wait after `action` before the next one runs
    async fn settle(&self, action: &UiAction);
}

/// Constant delay after every action
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_SETTLE_DELAY)
    }
}

#[async_trait]
impl SettleStrategy for FixedDelay {
    async fn settle(&self, _action: &UiAction) {
        tokio::time::sleep(self.0).await;
    }
}

/// No wait; for headless hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl SettleStrategy for Immediate {
    async fn settle(&self, _action: &UiAction) {}
}

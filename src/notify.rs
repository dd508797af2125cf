#![cfg(feature = "std")]

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::game::TurnNotice;

/// Delivery of "your turn" events. Called after the game lock is released;
/// an error is logged by the service and never undoes the move.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn turn_changed(&self, notice: &TurnNotice) -> anyhow::Result<()>;
}

/// Writes each notice to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn turn_changed(&self, notice: &TurnNotice) -> anyhow::Result<()> {
        log::info!("notify {}: {}", notice.player, notice.description);
        Ok(())
    }
}

/// Forwards notices to a receiver, e.g. a mail worker or a test.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<TurnNotice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<TurnNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    async fn turn_changed(&self, notice: &TurnNotice) -> anyhow::Result<()> {
        self.tx
            .send(notice.clone())
            .map_err(|_| anyhow::anyhow!("notification receiver dropped"))
    }
}

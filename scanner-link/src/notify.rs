//! Operator notice fan-out

use shared::message::Notice;
use tokio::sync::broadcast;

/// Broadcasts notices to whatever UI owns the channel.
///
/// Cloneable so every component can emit; a missing subscriber costs a
/// debug log, never an error.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn send(&self, notice: Notice) {
        tracing::debug!(
            category = %notice.category,
            level = %notice.level,
            "notice: {}",
            notice.message
        );
        if let Err(e) = self.tx.send(notice) {
            tracing::debug!("no notice subscribers: {e}");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

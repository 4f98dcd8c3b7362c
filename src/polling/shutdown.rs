use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Cooperative shutdown flag. The polling loop only looks at it between
/// operations, never in the middle of one.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl Shutdown {
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            log::info!("shutdown requested");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so the channel can't be closed here
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TriggerResult {
    Queued,
    AlreadyQueued,
    Stopped,
}

/// Requests an out-of-schedule cycle. At most one request waits behind the
/// running cycle; more are coalesced into it.
#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::Sender<()>,
}

impl ManualTrigger {
    pub fn channel() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    pub fn request(&self) -> TriggerResult {
        match self.tx.try_send(()) {
            Ok(()) => TriggerResult::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => TriggerResult::AlreadyQueued,
            Err(mpsc::error::TrySendError::Closed(_)) => TriggerResult::Stopped,
        }
    }
}

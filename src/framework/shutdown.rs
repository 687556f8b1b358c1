//! Cooperative shutdown for long-running actor loops.
//!
//! Resource actors stop when their last client is dropped. Actors that also listen
//! to external feeds (push notifications, broadcast events) never see their inputs
//! close on their own, so they select on a [`ShutdownListener`] as well.

use tokio::sync::watch;

/// Owner side. Dropping it counts as a shutdown request too.
#[derive(Debug)]
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once shutdown was triggered or the signal was dropped.
    pub async fn cancelled(&mut self) {
        // Err means the sender is gone, which we treat the same way.
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_every_listener() {
        let signal = ShutdownSignal::new();
        let mut first = signal.listener();
        let mut second = first.clone();
        assert!(!first.is_cancelled());

        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), first.cancelled()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), second.cancelled()).await.unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn dropping_the_signal_cancels() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.listener();
        drop(signal);
        tokio::time::timeout(Duration::from_secs(1), listener.cancelled()).await.unwrap();
        assert!(listener.is_cancelled());
    }
}

//! Stop flag shared by the long-running `watch` command.
//!
//! The flag is level-triggered: a monitor that subscribes after the signal
//! arrived still sees it, and every later wait returns at once.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of the stop flag. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the flag. Idempotent, and fine with no subscribers.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of the stop flag, held by the request monitor.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once the flag is raised or every [`Shutdown`] is gone.
    pub async fn recv(&mut self) {
        // Err means no owner is left to raise the flag.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    /// True once the flag is raised or no owner is left to raise it.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.clone().subscribe();
        assert!(!a.is_triggered());

        shutdown.trigger();
        a.recv().await;
        b.recv().await;
        assert!(a.is_triggered());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        assert!(late.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .unwrap();
        // Stays raised for every later wait.
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_owner_releases_waiters() {
        let shutdown = Shutdown::default();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_wait_blocks_until_trigger() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        assert!(
            tokio::time::timeout(Duration::from_millis(50), signal.recv())
                .await
                .is_err()
        );
    }

    #[test]
    fn test_trigger_without_subscribers() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        assert!(shutdown.subscribe().is_triggered());
    }
}

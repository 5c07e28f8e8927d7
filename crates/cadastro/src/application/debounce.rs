//! Debouncer - Run only the last of a burst of scheduled actions

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delays a callback until scheduling has been quiet for `delay`.
///
/// Each call to [`Debouncer::schedule`] discards the callback still waiting
/// from the previous call. A callback whose delay has elapsed runs to
/// completion on its own task; later calls cannot cancel it.
///
/// One instance backs exactly one logical action.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `callback`, replacing any callback still waiting
    pub fn schedule<F, Fut>(&self, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(callback());
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Discard the waiting callback, if any
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Whether a callback is still waiting for its delay to elapse
    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_only_last() {
        let debouncer = Debouncer::new(DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for i in 0..5 {
            let tx = tx.clone();
            debouncer.schedule(move || async move {
                let _ = tx.send(i);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(rx.recv().await, Some(4));

        tokio::time::sleep(DELAY * 10).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_quiet_period() {
        let debouncer = Debouncer::new(DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        debouncer.schedule(move || async move {
            let _ = tx.send(());
        });
        assert!(debouncer.is_pending());

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_callback_is_not_cancelled() {
        let debouncer = Debouncer::new(DELAY);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let slow = tx.clone();
        debouncer.schedule(move || async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = slow.send("slow");
        });
        tokio::time::sleep(DELAY * 2).await;

        debouncer.schedule(move || async move {
            let _ = tx.send("fast");
        });

        assert_eq!(rx.recv().await, Some("fast"));
        assert_eq!(rx.recv().await, Some("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_discard_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();

        let debouncer = Debouncer::new(DELAY);
        let first = tx.clone();
        debouncer.schedule(move || async move {
            let _ = first.send(1);
        });
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        let second = tx.clone();
        debouncer.schedule(move || async move {
            let _ = second.send(2);
        });
        drop(debouncer);
        drop(tx);

        tokio::time::sleep(DELAY * 10).await;
        assert_eq!(rx.recv().await, None);
    }
}

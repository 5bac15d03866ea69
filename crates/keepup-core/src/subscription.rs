use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a live feed; delivery stops when it is dropped or unsubscribed.
#[must_use = "dropping a Subscription stops delivery immediately"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Run `feed` on the current tokio runtime for as long as the handle lives
    pub fn spawn<F>(feed: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(feed),
        }
    }

    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unsubscribe_stops_feed() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let subscription = Subscription::spawn(async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(subscription.is_active());
        subscription.unsubscribe();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let stopped_at = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), stopped_at);
    }
}

use crate::store::RecordStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Last known number of waitlist records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Counter {
    /// Nothing fetched yet. Rendered as a placeholder rather than `0`.
    #[default]
    Unknown,
    Known(u64),
}

impl Counter {
    pub fn value(self) -> Option<u64> {
        match self {
            Self::Unknown => None,
            Self::Known(count) => Some(count),
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("..."),
            Self::Known(count) => f.write_str(&group_thousands(*count)),
        }
    }
}

fn group_thousands(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Read-through cache of the store's record count.
///
/// The value is only ever replaced by a successful `count()`; submissions
/// never bump it locally. Failed refreshes keep the previous value.
pub struct CounterSync<S> {
    store: Arc<S>,
    value: watch::Sender<Counter>,
}

impl<S: RecordStore> CounterSync<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (value, _rx) = watch::channel(Counter::Unknown);
        Self { store, value }
    }

    pub fn current(&self) -> Counter {
        *self.value.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Counter> {
        self.value.subscribe()
    }

    /// Fetches the count. Overlapping refreshes land in completion order.
    pub async fn refresh(&self) -> Counter {
        match self.store.count().await {
            Ok(count) => {
                debug!(count, "waitlist count refreshed");
                self.value.send_replace(Counter::Known(count));
            }
            Err(err) => warn!(error = %err, "waitlist count refresh failed, keeping last value"),
        }
        self.current()
    }

    /// Refreshes once now, then once per settled submission until every
    /// signal sender is gone.
    pub fn mount(self: Arc<Self>, mut settled: watch::Receiver<u64>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.refresh().await;
            while settled.changed().await.is_ok() {
                self.refresh().await;
            }
            debug!("settled signal closed, counter sync stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Field, SettledSignal, Settlement, SignupController};
    use crate::store::StoreError;
    use crate::store::memory::MemoryStore;
    use std::time::Duration;

    async fn wait_for(rx: &mut watch::Receiver<Counter>, expected: Counter) {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|value| *value == expected))
            .await
            .expect("counter did not update in time")
            .expect("counter sender dropped");
    }

    #[test]
    fn unknown_renders_as_placeholder() {
        assert_eq!(Counter::Unknown.to_string(), "...");
        assert_eq!(Counter::Known(0).to_string(), "0");
        assert_eq!(Counter::Known(999).to_string(), "999");
        assert_eq!(Counter::Known(1_234).to_string(), "1,234");
        assert_eq!(Counter::Known(12_345_678).to_string(), "12,345,678");
        assert_eq!(Counter::Unknown.value(), None);
    }

    #[tokio::test]
    async fn refresh_replaces_value() {
        let store = Arc::new(MemoryStore::default());
        let counter = CounterSync::new(Arc::clone(&store));
        assert_eq!(counter.current(), Counter::Unknown);

        assert_eq!(counter.refresh().await, Counter::Known(0));
        assert_eq!(store.count_calls(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_value() {
        let store = Arc::new(MemoryStore::default());
        let counter = CounterSync::new(Arc::clone(&store));

        store.fail_counts(Some(StoreError::Unavailable("offline".to_owned())));
        assert_eq!(counter.refresh().await, Counter::Unknown);

        store.fail_counts(None);
        counter.refresh().await;
        store.fail_counts(Some(StoreError::Unavailable("offline".to_owned())));
        assert_eq!(counter.refresh().await, Counter::Known(0));
    }

    #[tokio::test]
    async fn mounted_counter_follows_settled_submissions() {
        let store = Arc::new(MemoryStore::default());
        let signal = SettledSignal::new();
        let counter = Arc::new(CounterSync::new(Arc::clone(&store)));
        let mut rx = counter.subscribe();
        let task = Arc::clone(&counter).mount(signal.subscribe());

        wait_for(&mut rx, Counter::Known(0)).await;

        let mut form = SignupController::new(Arc::clone(&store), signal.clone());
        form.update_field(Field::FirstName, "Ada");
        form.update_field(Field::Email, "ada@example.com");
        assert_eq!(form.submit().await, Some(Settlement::Joined));
        wait_for(&mut rx, Counter::Known(1)).await;

        let mut again = SignupController::new(Arc::clone(&store), signal.clone());
        again.update_field(Field::FirstName, "Ada");
        again.update_field(Field::Email, "ada@example.com");
        let refreshes = store.count_calls();
        assert_eq!(again.submit().await, Some(Settlement::AlreadyJoined));
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.count_calls() == refreshes {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("duplicate did not trigger a refresh");
        assert_eq!(counter.current(), Counter::Known(1));

        drop(form);
        drop(again);
        drop(signal);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn failed_submission_does_not_refresh() {
        let store = Arc::new(MemoryStore::default());
        let signal = SettledSignal::new();
        let counter = Arc::new(CounterSync::new(Arc::clone(&store)));
        let mut rx = counter.subscribe();
        let _task = Arc::clone(&counter).mount(signal.subscribe());
        wait_for(&mut rx, Counter::Known(0)).await;

        store.fail_inserts(Some(StoreError::Unavailable("offline".to_owned())));
        let mut form = SignupController::new(Arc::clone(&store), signal.clone());
        form.update_field(Field::FirstName, "Ada");
        form.update_field(Field::Email, "ada@example.com");
        assert!(matches!(form.submit().await, Some(Settlement::Failed { .. })));

        tokio::task::yield_now().await;
        assert_eq!(store.count_calls(), 1);
        assert_eq!(counter.current(), Counter::Known(0));
    }
}

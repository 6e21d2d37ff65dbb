use crate::controller::{SettledSignal, SignupController};
use crate::counter::CounterSync;
use crate::storage::FileStore;
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub counter: Arc<CounterSync<FileStore>>,
    pub settled: SettledSignal,
    pub reset_after: Duration,
}

impl AppState {
    pub fn new(store: FileStore, reset_after: Duration) -> Self {
        let store = Arc::new(store);
        Self {
            counter: Arc::new(CounterSync::new(Arc::clone(&store))),
            store,
            settled: SettledSignal::new(),
            reset_after,
        }
    }

    /// A fresh form bound to the shared store and counter signal.
    pub fn controller(&self) -> SignupController<FileStore> {
        SignupController::new(Arc::clone(&self.store), self.settled.clone())
            .with_reset_after(self.reset_after)
    }
}

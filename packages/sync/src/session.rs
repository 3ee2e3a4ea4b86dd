//! One live editing session: the store, its coordinator, and the poll task

use crate::buffer::ExternalBuffer;
use crate::config::SyncConfig;
use crate::coordinator::{SyncCoordinator, SyncPhase, SyncTarget};
use crate::error::{SyncError, SyncResult};
use drafter_document::DocumentStore;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

type Shared<T> = Arc<Mutex<T>>;

/// Owns the document store and drives sync in a background task.
///
/// Created with [`init`](Self::init) and torn down with
/// [`dispose`](Self::dispose); dropping an undisposed session aborts the task.
pub struct DocumentSession<B: ExternalBuffer + 'static> {
    store: Shared<DocumentStore>,
    coordinator: Shared<SyncCoordinator<B>>,
    changes: watch::Sender<u64>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<B: ExternalBuffer + 'static> DocumentSession<B> {
    /// Start syncing `store` into `buffer`. Must be called inside a tokio runtime.
    pub fn init(store: DocumentStore, buffer: B, config: SyncConfig, target: SyncTarget) -> Self {
        let revision = store.revision();
        let store = Arc::new(Mutex::new(store));
        let coordinator = Arc::new(Mutex::new(SyncCoordinator::new(
            buffer,
            config.clone(),
            target,
        )));
        let (changes, changes_rx) = watch::channel(revision);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            store.clone(),
            coordinator.clone(),
            config,
            changes_rx,
            shutdown_rx,
        ));
        info!("document session started");

        Self {
            store,
            coordinator,
            changes,
            shutdown,
            task: Some(task),
        }
    }

    /// Apply a store mutation and schedule an outbound push
    pub async fn mutate<F, R>(&self, mutation: F) -> R
    where
        F: FnOnce(&mut DocumentStore) -> R,
    {
        let mut store = self.store.lock().await;
        let result = mutation(&mut *store);
        let revision = store.revision();
        drop(store);

        self.changes.send_replace(revision);
        result
    }

    pub async fn read<F, R>(&self, reader: F) -> R
    where
        F: FnOnce(&DocumentStore) -> R,
    {
        let store = self.store.lock().await;
        reader(&*store)
    }

    pub async fn phase(&self) -> SyncPhase {
        self.coordinator.lock().await.phase()
    }

    /// Stop the poll task and wait for it to finish
    pub async fn dispose(mut self) -> SyncResult<DocumentStore> {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| SyncError::Task(e.to_string()))?;
        }
        info!("document session disposed");

        let store = self.store.lock().await;
        Ok(store.clone())
    }
}

impl<B: ExternalBuffer + 'static> Drop for DocumentSession<B> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<B: ExternalBuffer + 'static>(
    store: Shared<DocumentStore>,
    coordinator: Shared<SyncCoordinator<B>>,
    config: SyncConfig,
    mut changes: watch::Receiver<u64>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    push(&store, &coordinator).await;

    loop {
        tokio::select! {
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            result = changes.changed() => {
                if result.is_err() {
                    break;
                }
                push(&store, &coordinator).await;
            }
            _ = ticker.tick() => {
                // The first push is retried until the buffer accepts it
                let synced = coordinator.lock().await.has_synced();
                if !synced {
                    push(&store, &coordinator).await;
                }
                pull(&store, &coordinator, &config).await;
            }
        }
    }
    debug!("sync task stopped");
}

async fn push<B: ExternalBuffer>(store: &Shared<DocumentStore>, coordinator: &Shared<SyncCoordinator<B>>) {
    let mut coordinator = coordinator.lock().await;
    let mut store = store.lock().await;
    match coordinator.push_outbound(&mut *store) {
        Ok(outcome) => debug!(?outcome, "outbound sync"),
        Err(e) => warn!("outbound sync failed, will retry on next change: {}", e),
    }
}

/// Poll, then wait for the edit to settle before parsing it
async fn pull<B: ExternalBuffer>(
    store: &Shared<DocumentStore>,
    coordinator: &Shared<SyncCoordinator<B>>,
    config: &SyncConfig,
) {
    let mut coordinator = coordinator.lock().await;
    let mut source = match coordinator.observe_inbound() {
        Ok(Some(source)) => source,
        Ok(None) => return,
        Err(e) => {
            warn!("failed to poll buffer: {}", e);
            return;
        }
    };

    for _ in 0..config.max_debounce_rounds {
        sleep(config.debounce()).await;
        match coordinator.current_source() {
            Ok(Some(next)) if next != source => source = next,
            _ => break,
        }
    }

    let mut store = store.lock().await;
    let outcome = coordinator.apply_inbound(&mut *store, source);
    debug!(?outcome, "inbound sync");
}

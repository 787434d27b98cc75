// crates/edge/src/watch.rs

//! Reload the content tree when the content directory changes.
//!
//! notify events arrive on a tokio channel; a burst is debounced into one
//! refresh that rescans the store, forgets memoized placeholders and
//! flushes the API cache.

use adapt::cache::InMemoryCache;
use adapt::media::MediaLibrary;
use adapt::store::FsContentStore;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serve::cache::ApiCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

const DEBOUNCE: Duration = Duration::from_millis(40);

/// Live watcher; dropping it stops watching.
pub struct ContentWatcher {
    watcher: Option<RecommendedWatcher>,
    task: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Drop for ContentWatcher {
    fn drop(&mut self) {
        self.watcher.take();
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl ContentWatcher {
    pub async fn stop(mut self) {
        self.watcher.take();
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Reads during a rescan show up as access events; only changes count.
fn is_change(event: &Event) -> bool {
    !matches!(event.kind, EventKind::Access(_))
}

#[tracing::instrument(skip_all)]
async fn refresh(store: &Arc<FsContentStore>, media: &MediaLibrary, cache: &InMemoryCache) {
    let rescan = Arc::clone(store);
    match tokio::task::spawn_blocking(move || rescan.reload()).await {
        Ok(Ok(())) => info!("content reloaded"),
        Ok(Err(e)) => warn!("reload failed, keeping previous content: {}", e),
        Err(e) => warn!("reload task failed: {}", e),
    }
    media.clear();
    cache.flush().await;
}

/// Watch the store's root recursively. Must be called inside a tokio runtime.
pub fn watch_content(
    store: Arc<FsContentStore>,
    media: Arc<MediaLibrary>,
    cache: Arc<InMemoryCache>,
) -> notify::Result<ContentWatcher> {
    let (fs_tx, mut fs_rx) = mpsc::unbounded_channel::<Event>();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(ev) if is_change(&ev) => {
            let _ = fs_tx.send(ev);
        }
        Ok(_) => {}
        Err(e) => warn!("watch error: {}", e),
    })?;
    watcher.watch(store.root(), RecursiveMode::Recursive)?;
    info!("watching {}", store.root().display());

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                maybe = fs_rx.recv() => {
                    let Some(ev) = maybe else { break };
                    debug!("change: {:?}", ev.paths);
                    tokio::time::sleep(DEBOUNCE).await;
                    let mut burst = 1;
                    while fs_rx.try_recv().is_ok() {
                        burst += 1;
                    }
                    debug!("{} events coalesced", burst);
                    refresh(&store, &media, &cache).await;
                }
            }
        }
    });

    Ok(ContentWatcher {
        watcher: Some(watcher),
        task: Some(task),
        shutdown_tx: Some(shutdown_tx),
    })
}

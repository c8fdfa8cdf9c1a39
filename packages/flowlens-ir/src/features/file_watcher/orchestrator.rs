//! The incremental orchestrator (§4.J): a single consumer task drains the
//! bounded event queue, runs it through the debouncer, and flushes a
//! `ChangeSet` to the caller's callback.

use std::sync::Arc;
use std::time::Instant as StdInstant;

use notify::RecommendedWatcher;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant as TokioInstant;

use super::debouncer::Debouncer;
use super::domain::{ChangeSet, FileChangeEvent, WatchConfig};
use super::error::OrchestratorError;
use super::watcher;

/// Handle to a running orchestrator. Dropping it (or calling `stop`)
/// cancels the consumer task, force-flushing any buffered events first.
pub struct Orchestrator {
    cancel_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    _watcher: RecommendedWatcher,
}

impl Orchestrator {
    pub fn start<F>(config: WatchConfig, on_flush: F) -> Result<Self, OrchestratorError>
    where
        F: Fn(ChangeSet) + Send + Sync + 'static,
    {
        let config = Arc::new(config);
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let watcher = watcher::install(config.clone(), tx)?;
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let handle = tokio::spawn(run_consumer(config, rx, cancel_rx, on_flush));

        Ok(Self { cancel_tx, handle: Some(handle), _watcher: watcher })
    }

    /// Cancels the consumer task, force-flushing any buffered events, and
    /// waits for it to finish.
    pub async fn stop(mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

async fn run_consumer<F>(
    _config: Arc<WatchConfig>,
    mut rx: mpsc::Receiver<FileChangeEvent>,
    mut cancel_rx: watch::Receiver<bool>,
    on_flush: F,
) where
    F: Fn(ChangeSet) + Send + Sync + 'static,
{
    let mut debouncer = Debouncer::new(_config.debounce_duration, _config.max_batch_window);

    loop {
        let deadline = debouncer.next_deadline();
        tokio::select! {
            biased;

            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    let set = debouncer.force_flush();
                    if !set.is_empty() {
                        on_flush(set);
                    }
                    return;
                }
            }

            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        debouncer.record(event, StdInstant::now());
                    }
                    None => {
                        let set = debouncer.force_flush();
                        if !set.is_empty() {
                            on_flush(set);
                        }
                        return;
                    }
                }
            }

            _ = sleep_until_opt(deadline) => {
                if debouncer.should_flush(StdInstant::now()) {
                    let set = debouncer.drain();
                    if !set.is_empty() {
                        on_flush(set);
                    }
                }
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<StdInstant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(TokioInstant::from_std(d)).await,
        None => std::future::pending::<()>().await,
    }
}

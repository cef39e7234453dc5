// ABOUTME: Watches contract logs for the completion event of one deployment.
// ABOUTME: Resolves on the first matching log and latches; lost subscriptions are retried.

use crate::chain::{DecodedLog, LogFilter, LogSubscriber};
use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::provision::ProvisionResult;
use crate::types::Address;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The event that signals completion, and where it is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub contract: Address,
    pub event: String,
}

/// First log in `batch` that completes the deployment keyed by `key`.
///
/// A log matches when it is the watched event, carries the same correlation
/// key, and names the resource it produced.
pub fn find_first_match(
    batch: &[DecodedLog],
    target: &WatchTarget,
    key: &str,
) -> Option<ProvisionResult> {
    batch
        .iter()
        .filter(|log| log.address == target.contract && log.event == target.event)
        .filter(|log| log.correlation_key.as_deref().map(str::trim) == Some(key))
        .find_map(|log| {
            Some(ProvisionResult {
                resource_id: log.resource_id.clone()?,
                endpoint_url: log.endpoint_url.clone(),
            })
        })
}

/// Subscribes while `enabled && key.is_some() && !resolved`.
pub struct CompletionWatcher<S: LogSubscriber + ?Sized + 'static> {
    subscriber: Arc<S>,
    target: WatchTarget,
    key: Option<String>,
    enabled: bool,
    retry_delay: Duration,
    resolved: Arc<AtomicBool>,
    result: Arc<watch::Sender<Option<ProvisionResult>>>,
    task: Option<JoinHandle<()>>,
}

impl<S: LogSubscriber + ?Sized + 'static> CompletionWatcher<S> {
    pub fn new(subscriber: Arc<S>, target: WatchTarget) -> Self {
        let (result, _) = watch::channel(None);
        Self {
            subscriber,
            target,
            key: None,
            enabled: false,
            retry_delay: DEFAULT_POLL_INTERVAL,
            resolved: Arc::new(AtomicBool::new(false)),
            result: Arc::new(result),
            task: None,
        }
    }

    /// Wait between resubscribe attempts. Defaults to the poll interval.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the correlation key and whether to watch.
    ///
    /// Once resolved the watcher never subscribes again, whatever the key.
    pub fn set_target(&mut self, key: Option<String>, enabled: bool) {
        let key = key.map(|k| k.trim().to_string());
        if key == self.key && enabled == self.enabled {
            return;
        }

        self.drop_subscription();
        self.key = key;
        self.enabled = enabled;

        if !enabled || self.is_resolved() {
            return;
        }
        let Some(key) = self.key.clone() else {
            return;
        };

        let filter = LogFilter {
            address: self.target.contract.clone(),
            event: self.target.event.clone(),
            correlation_key: Some(key.clone()),
        };
        tracing::debug!("Watching {} logs for key {}", self.target.event, key);
        self.task = Some(tokio::spawn(watch_logs(
            Arc::clone(&self.subscriber),
            filter,
            self.target.clone(),
            key,
            self.retry_delay,
            Arc::clone(&self.resolved),
            Arc::clone(&self.result),
        )));
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    pub fn result(&self) -> Option<ProvisionResult> {
        self.result.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ProvisionResult>> {
        self.result.subscribe()
    }

    /// Whether a subscription task is alive.
    pub fn is_watching(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Forget any result and start with a fresh latch. Drops the subscription.
    pub fn reset(&mut self) {
        self.drop_subscription();
        self.key = None;
        self.enabled = false;
        self.resolved = Arc::new(AtomicBool::new(false));
        self.result.send_replace(None);
    }

    fn drop_subscription(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: LogSubscriber + ?Sized + 'static> Drop for CompletionWatcher<S> {
    fn drop(&mut self) {
        self.drop_subscription();
    }
}

async fn watch_logs<S: LogSubscriber + ?Sized>(
    subscriber: Arc<S>,
    filter: LogFilter,
    target: WatchTarget,
    key: String,
    retry_delay: Duration,
    resolved: Arc<AtomicBool>,
    result: Arc<watch::Sender<Option<ProvisionResult>>>,
) {
    while !resolved.load(Ordering::SeqCst) {
        match subscriber.subscribe_logs(&filter).await {
            Ok(mut stream) => {
                while let Some(batch) = stream.next().await {
                    if resolved.load(Ordering::SeqCst) {
                        return;
                    }

                    let Some(found) = find_first_match(&batch, &target, &key) else {
                        tracing::debug!(
                            "No match for key {} in batch of {} logs",
                            key,
                            batch.len()
                        );
                        continue;
                    };

                    if resolved
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                    {
                        tracing::info!(
                            "{} observed for key {}: resource {}",
                            target.event,
                            key,
                            found.resource_id
                        );
                        result.send_replace(Some(found));
                    }
                    return;
                }
                tracing::debug!("Log subscription for key {} closed, resubscribing", key);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to subscribe to {} logs: {}, retrying in {:?}",
                    filter.event,
                    e,
                    retry_delay
                );
            }
        }

        tokio::time::sleep(retry_delay).await;
    }
}

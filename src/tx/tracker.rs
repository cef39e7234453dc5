// ABOUTME: Drives one transaction through signing, broadcast, and confirmation.
// ABOUTME: Records history entries and reports every status change to an observer.

use super::error::{TxError, short_revert_message};
use crate::chain::{DecodedLog, ReceiptStatus, TxBroadcaster, TxRequest, Wallet};
use crate::store::{TrackedTx, TrackedTxStatus, TxHistory};
use crate::types::{Address, TxHash};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of a tracked transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TxStatus {
    #[default]
    Idle,
    /// Waiting for the wallet prompt.
    Signing,
    /// Broadcast, waiting for a receipt.
    Pending,
    Confirmed,
    Failed,
}

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxSnapshot {
    pub status: TxStatus,
    pub hash: Option<TxHash>,
    /// Correlation id emitted by the target contract in the receipt.
    pub call_id: Option<u64>,
    pub error: Option<TxError>,
}

/// A transaction to send and how to find its correlation id afterwards.
#[derive(Debug, Clone)]
pub struct Submission {
    pub request: TxRequest,
    pub label: String,
    /// Event emitted by `request.to` whose correlation key identifies the call.
    pub correlation_event: String,
}

impl Submission {
    pub fn new(request: TxRequest, correlation_event: impl Into<String>) -> Self {
        Self {
            label: request.label(),
            request,
            correlation_event: correlation_event.into(),
        }
    }
}

/// Tracks a single in-flight transaction at a time.
pub struct TxTracker<B: TxBroadcaster + ?Sized> {
    wallet: Arc<dyn Wallet>,
    chain: Arc<B>,
    history: Arc<dyn TxHistory>,
    snapshot: Mutex<TxSnapshot>,
    generation: AtomicU64,
}

impl<B: TxBroadcaster + ?Sized> TxTracker<B> {
    pub fn new(wallet: Arc<dyn Wallet>, chain: Arc<B>, history: Arc<dyn TxHistory>) -> Self {
        Self {
            wallet,
            chain,
            history,
            snapshot: Mutex::new(TxSnapshot::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> TxSnapshot {
        self.snapshot.lock().clone()
    }

    pub fn status(&self) -> TxStatus {
        self.snapshot.lock().status
    }

    pub fn call_id(&self) -> Option<u64> {
        self.snapshot.lock().call_id
    }

    pub fn error(&self) -> Option<TxError> {
        self.snapshot.lock().error.clone()
    }

    /// Return to idle. An in-flight submission stops reporting after this.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.lock() = TxSnapshot::default();
    }

    /// Sign, broadcast, and wait for one confirmation.
    ///
    /// Returns the hash once confirmed, or `None` on any failure; the failure
    /// itself is left in the snapshot. `observe` sees every state change.
    pub async fn submit<F>(&self, submission: Submission, mut observe: F) -> Option<TxHash>
    where
        F: FnMut(&TxSnapshot) + Send,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.publish(generation, &mut observe, |s| {
            *s = TxSnapshot {
                status: TxStatus::Signing,
                ..Default::default()
            };
        })?;

        tracing::debug!("Requesting signature: {}", submission.label);
        let signed = match self.wallet.sign_transaction(&submission.request).await {
            Ok(signed) => signed,
            Err(e) => {
                let err = if e.is_rejection() {
                    TxError::Rejected
                } else {
                    TxError::Signing(e.to_string())
                };
                self.fail(generation, &mut observe, err);
                return None;
            }
        };

        let hash = match self.chain.broadcast(&signed).await {
            Ok(hash) => hash,
            Err(e) => {
                self.fail(generation, &mut observe, TxError::Broadcast(e.detail().to_string()));
                return None;
            }
        };

        tracing::info!("Broadcast {}: {}", submission.label, hash);
        if let Err(e) = self
            .history
            .append(TrackedTx::pending(hash.clone(), submission.label.clone()))
            .await
        {
            tracing::warn!("Failed to record transaction {}: {}", hash, e);
        }

        self.publish(generation, &mut observe, |s| {
            s.status = TxStatus::Pending;
            s.hash = Some(hash.clone());
        })?;

        let receipt = match self.chain.wait_for_receipt(&hash, 1).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.settle(&hash, TrackedTxStatus::Failed).await;
                let message = e.detail();
                let err = if message.to_lowercase().contains("revert") {
                    TxError::Reverted(short_revert_message(message))
                } else {
                    TxError::Receipt(message.to_string())
                };
                self.fail(generation, &mut observe, err);
                return None;
            }
        };

        if receipt.status == ReceiptStatus::Reverted {
            self.settle(&hash, TrackedTxStatus::Failed).await;
            let reason = receipt
                .revert_reason
                .as_deref()
                .map(short_revert_message)
                .unwrap_or_else(|| "Transaction reverted".to_string());
            self.fail(generation, &mut observe, TxError::Reverted(reason));
            return None;
        }

        self.settle(&hash, TrackedTxStatus::Confirmed).await;

        let call_id = extract_correlation_id(
            &receipt.logs,
            &submission.request.to,
            &submission.correlation_event,
        );
        tracing::debug!(
            "Confirmed {} in block {} (call id {:?})",
            hash,
            receipt.block_number,
            call_id
        );

        self.publish(generation, &mut observe, |s| {
            s.status = TxStatus::Confirmed;
            s.call_id = call_id;
        })?;

        Some(hash)
    }

    /// Apply `update` if this submission is still current, then notify.
    fn publish<F>(
        &self,
        generation: u64,
        observe: &mut F,
        update: impl FnOnce(&mut TxSnapshot),
    ) -> Option<()>
    where
        F: FnMut(&TxSnapshot),
    {
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Dropping update from superseded submission");
            return None;
        }

        let snapshot = {
            let mut s = self.snapshot.lock();
            update(&mut s);
            s.clone()
        };
        observe(&snapshot);
        Some(())
    }

    fn fail<F>(&self, generation: u64, observe: &mut F, err: TxError)
    where
        F: FnMut(&TxSnapshot),
    {
        tracing::warn!("Transaction failed: {}", err);
        let _ = self.publish(generation, observe, |s| {
            s.status = TxStatus::Failed;
            s.error = Some(err);
        });
    }

    async fn settle(&self, hash: &TxHash, status: TrackedTxStatus) {
        if let Err(e) = self.history.update_status(hash, status).await {
            tracing::warn!("Failed to update transaction {}: {}", hash, e);
        }
    }
}

/// First correlation id emitted by `contract` as `event` among `logs`.
///
/// Logs from other contracts, other events, and non-numeric keys are skipped.
pub fn extract_correlation_id(
    logs: &[DecodedLog],
    contract: &Address,
    event: &str,
) -> Option<u64> {
    logs.iter()
        .filter(|log| &log.address == contract && log.event == event)
        .find_map(|log| log.correlation_key.as_deref()?.trim().parse().ok())
}

// ABOUTME: Transaction broadcast and receipt capability.
// ABOUTME: Receipts carry decoded logs so callers can extract correlation ids.

use super::ChainError;
use super::shared_types::{SignedTx, TxReceipt};
use crate::types::TxHash;
use async_trait::async_trait;

/// Broadcast signed transactions and wait for them to land.
#[async_trait]
pub trait TxBroadcaster: Send + Sync {
    /// Send a signed transaction to the network.
    async fn broadcast(&self, tx: &SignedTx) -> Result<TxHash, ChainError>;

    /// Wait until the transaction has the given number of confirmations.
    ///
    /// There is no deadline here; the transport's own timeout applies.
    async fn wait_for_receipt(
        &self,
        hash: &TxHash,
        confirmations: u64,
    ) -> Result<TxReceipt, ChainError>;
}

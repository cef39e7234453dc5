// ABOUTME: Transaction history entries and the history collaborator trait.
// ABOUTME: Entries are appended at broadcast and settled exactly once.

use super::StoreError;
use crate::types::TxHash;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedTxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// A broadcast transaction as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTx {
    pub hash: TxHash,
    pub label: String,
    pub status: TrackedTxStatus,
    pub timestamp: DateTime<Utc>,
}

impl TrackedTx {
    pub fn pending(hash: TxHash, label: impl Into<String>) -> Self {
        Self {
            hash,
            label: label.into(),
            status: TrackedTxStatus::Pending,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only log of transactions the user has sent.
#[async_trait]
pub trait TxHistory: Send + Sync {
    async fn append(&self, tx: TrackedTx) -> Result<(), StoreError>;

    async fn update_status(&self, hash: &TxHash, status: TrackedTxStatus)
    -> Result<(), StoreError>;
}

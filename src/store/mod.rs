// ABOUTME: Storage collaborators: resource records and transaction history.
// ABOUTME: Traits are injected into the deployer; in-memory versions ship for tests and the CLI.

mod history;
mod memory;
mod record;

pub use history::{TrackedTx, TrackedTxStatus, TxHistory};
pub use memory::{MemoryResourceStore, MemoryTxHistory};
pub use record::{RecordPatch, ResourceKind, ResourceRecord, ResourceStatus, ResourceStore};

/// Errors from storage collaborators.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("no record for key: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

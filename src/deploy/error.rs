// ABOUTME: Error types for deployment attempts.
// ABOUTME: Covers wallet, broadcast, revert, precondition, and provisioning failures.

use crate::tx::TxError;
use std::time::Duration;

/// Why a deployment attempt failed or could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// The account holder declined the wallet prompt.
    #[error("Transaction rejected in wallet")]
    WalletRejected,

    /// The wallet failed for a reason other than rejection.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The signed transaction could not be sent.
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    /// The transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Waiting for the receipt failed.
    #[error("Receipt unavailable: {0}")]
    Receipt(String),

    /// New-service path needs at least one operator.
    #[error("No operators available")]
    NoOperators,

    /// Job arguments could not be encoded.
    #[error("{0}")]
    Encode(String),

    /// The receipt did not contain the expected correlation event.
    #[error("No call id found in transaction receipt")]
    MissingCallId,

    /// The operator reported a terminal failure.
    #[error("Provisioning failed: {0}")]
    ProvisionFailed(String),

    /// The configured provisioning deadline passed.
    #[error("Provisioning timed out after {0:?}")]
    ProvisionTimeout(Duration),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    UserRejected,
    BroadcastFailure,
    OnChainRevert,
    PreconditionUnmet,
    ProvisionFailed,
    Timeout,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::WalletRejected => DeployErrorKind::UserRejected,
            DeployError::Wallet(_) | DeployError::BroadcastFailed(_) | DeployError::Receipt(_) => {
                DeployErrorKind::BroadcastFailure
            }
            DeployError::Reverted(_) => DeployErrorKind::OnChainRevert,
            DeployError::NoOperators | DeployError::Encode(_) => {
                DeployErrorKind::PreconditionUnmet
            }
            DeployError::MissingCallId | DeployError::ProvisionFailed(_) => {
                DeployErrorKind::ProvisionFailed
            }
            DeployError::ProvisionTimeout(_) => DeployErrorKind::Timeout,
        }
    }
}

impl From<TxError> for DeployError {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Rejected => DeployError::WalletRejected,
            TxError::Signing(msg) => DeployError::Wallet(msg),
            TxError::Broadcast(msg) => DeployError::BroadcastFailed(msg),
            TxError::Reverted(msg) => DeployError::Reverted(msg),
            TxError::Receipt(msg) => DeployError::Receipt(msg),
        }
    }
}

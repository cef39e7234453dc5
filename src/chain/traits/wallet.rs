// ABOUTME: Wallet signing capability.
// ABOUTME: The wallet prompt is the first suspension point of every deployment.

use super::shared_types::{SignedTx, TxRequest};
use async_trait::async_trait;

/// A connected wallet able to sign transaction requests.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Ask the account holder to sign. Resolves when the prompt is answered.
    async fn sign_transaction(&self, request: &TxRequest) -> Result<SignedTx, WalletError>;
}

/// Errors from the wallet.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("user rejected the request: {0}")]
    Rejected(String),

    #[error("no wallet connected")]
    NotConnected,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl WalletError {
    /// Whether the holder declined, as opposed to the wallet failing.
    ///
    /// Some wallets surface rejection as a generic signing error carrying the
    /// EIP-1193 `4001` code or a "user rejected" message.
    pub fn is_rejection(&self) -> bool {
        match self {
            WalletError::Rejected(_) => true,
            WalletError::NotConnected => false,
            WalletError::Signing(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("user rejected")
                    || msg.contains("user denied")
                    || msg.contains("4001")
            }
        }
    }
}

// ABOUTME: Composable capability traits for the blockchain client.
// ABOUTME: Defines Wallet, TxBroadcaster, ContractReader, LogSubscriber, ChainClient.

mod logs;
mod reads;
mod shared_types;
mod transactions;
mod wallet;

pub use logs::{LogBatchStream, LogSubscriber};
pub use reads::ContractReader;
pub use shared_types::*;
pub use transactions::TxBroadcaster;
pub use wallet::{Wallet, WalletError};

/// Everything the deployer needs from the chain besides signing.
///
/// Automatically implemented for any type providing all capabilities.
pub trait ChainClient: TxBroadcaster + ContractReader + LogSubscriber {}

impl<T> ChainClient for T where T: TxBroadcaster + ContractReader + LogSubscriber {}

/// Errors reported by the chain client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("receipt unavailable: {0}")]
    Receipt(String),

    #[error("contract read failed: {0}")]
    Read(String),

    #[error("log subscription failed: {0}")]
    Subscription(String),

    #[error("rpc transport error: {0}")]
    Transport(String),
}

impl ChainError {
    /// The underlying message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            ChainError::Broadcast(msg)
            | ChainError::Receipt(msg)
            | ChainError::Read(msg)
            | ChainError::Subscription(msg)
            | ChainError::Transport(msg) => msg,
        }
    }
}

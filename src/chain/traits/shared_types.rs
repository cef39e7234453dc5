// ABOUTME: Shared types for chain capability traits.
// ABOUTME: Transaction requests, receipts, decoded logs, and service records.

use crate::types::{Address, BlueprintId, ServiceId, TxHash};
use bytes::Bytes;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

// =============================================================================
// Transaction Types
// =============================================================================

/// The services-contract call a transaction performs.
///
/// ABI encoding is the chain client's business; this only carries arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// Submit a job to an existing service.
    SubmitJob {
        service: ServiceId,
        job: u8,
        args: Bytes,
    },

    /// Ask operators to stand up a new service instance.
    RequestService {
        blueprint: BlueprintId,
        operators: NonEmpty<Address>,
        args: Bytes,
        permitted_callers: Vec<Address>,
        ttl_blocks: u64,
        payment_asset: Address,
    },
}

/// An unsigned transaction aimed at the services contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub to: Address,
    pub call: ContractCall,
    /// Native value attached, in wei.
    pub value: u128,
}

impl TxRequest {
    pub fn submit_job(
        contract: Address,
        service: ServiceId,
        job: u8,
        args: Bytes,
        value: u128,
    ) -> Self {
        Self {
            to: contract,
            call: ContractCall::SubmitJob { service, job, args },
            value,
        }
    }

    /// Request a new service, paid in the native asset with nothing attached.
    pub fn request_service(
        contract: Address,
        blueprint: BlueprintId,
        operators: NonEmpty<Address>,
        args: Bytes,
        permitted_callers: Vec<Address>,
        ttl_blocks: u64,
    ) -> Self {
        Self {
            to: contract,
            call: ContractCall::RequestService {
                blueprint,
                operators,
                args,
                permitted_callers,
                ttl_blocks,
                payment_asset: Address::zero(),
            },
            value: 0,
        }
    }

    /// Short human label for transaction history.
    pub fn label(&self) -> String {
        match &self.call {
            ContractCall::SubmitJob { service, job, .. } => {
                format!("Submit job {job} to service #{service}")
            }
            ContractCall::RequestService { blueprint, .. } => {
                format!("Request service for blueprint #{blueprint}")
            }
        }
    }
}

/// A request after the wallet has signed it.
#[derive(Debug, Clone)]
pub struct SignedTx {
    pub request: TxRequest,
    /// Opaque signed payload for the broadcaster.
    pub raw: Bytes,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// A transaction receipt with logs already decoded against the contract ABI.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: u64,
    pub logs: Vec<DecodedLog>,
    /// Revert data decoded to text, when the client could.
    pub revert_reason: Option<String>,
}

// =============================================================================
// Log Types
// =============================================================================

/// A contract log decoded by the chain client.
///
/// Only the fields the deployer correlates on are lifted out of the event
/// arguments: the correlation key (call index or request id), and for
/// completion events the resulting resource id and endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedLog {
    pub address: Address,
    pub event: String,
    #[serde(default)]
    pub correlation_key: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub log_index: Option<u32>,
}

/// Which logs a subscription should deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub event: String,
    /// Indexed-argument filter, if the transport supports one. Subscribers
    /// must still check keys themselves.
    pub correlation_key: Option<String>,
}

// =============================================================================
// Service Types
// =============================================================================

/// An on-chain service record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub blueprint: BlueprintId,
    pub owner: Address,
    #[serde(default)]
    pub permitted_callers: Vec<Address>,
    pub ttl_blocks: u64,
}

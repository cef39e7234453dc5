// ABOUTME: Scriptable wallet and chain client fakes.
// ABOUTME: Responses are configured up front; gates let tests pause at signing or pending.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use sandbox_deployer::chain::{
    ChainError, ContractReader, DecodedLog, LogBatchStream, LogFilter, LogSubscriber,
    ReceiptStatus, ServiceRecord, SignedTx, TxBroadcaster, TxReceipt, TxRequest, Wallet,
    WalletError,
};
use sandbox_deployer::types::{Address, BlueprintId, ServiceId, TxHash};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, mpsc};

pub fn hash(value: &str) -> TxHash {
    value.parse().unwrap()
}

/// A log emitted by `contract` with a correlation key and optional resource.
pub fn log(contract: &Address, event: &str, key: &str, resource: Option<&str>) -> DecodedLog {
    DecodedLog {
        address: contract.clone(),
        event: event.to_string(),
        correlation_key: Some(key.to_string()),
        resource_id: resource.map(str::to_string),
        endpoint_url: None,
        block_number: Some(1),
        log_index: Some(0),
    }
}

#[derive(Default)]
pub struct FakeWallet {
    error: Mutex<Option<WalletError>>,
    requests: Mutex<Vec<TxRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        let wallet = Self::default();
        *wallet.error.lock() = Some(WalletError::Rejected("User denied".into()));
        wallet
    }

    /// Wallet that waits for the returned gate before answering.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let wallet = Self {
            gate: Some(Arc::clone(&gate)),
            ..Default::default()
        };
        (wallet, gate)
    }

    pub fn requests(&self) -> Vec<TxRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn sign_transaction(&self, request: &TxRequest) -> Result<SignedTx, WalletError> {
        self.requests.lock().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(err) = self.error.lock().clone() {
            return Err(err);
        }
        Ok(SignedTx {
            request: request.clone(),
            raw: Bytes::from_static(b"signed"),
        })
    }
}

#[derive(Clone)]
pub struct FakeService {
    pub record: ServiceRecord,
    pub active: bool,
    pub operators: Vec<Address>,
    pub permitted: Vec<Address>,
}

impl FakeService {
    pub fn active(id: u64, owner: Address) -> Self {
        Self {
            record: ServiceRecord {
                id: ServiceId::new(id),
                blueprint: BlueprintId::new(1),
                owner: owner.clone(),
                permitted_callers: vec![owner.clone()],
                ttl_blocks: 0,
            },
            active: true,
            operators: vec![super::addr(0x10)],
            permitted: vec![owner],
        }
    }
}

pub struct FakeChain {
    tx_hash: TxHash,
    broadcast_error: Mutex<Option<ChainError>>,
    receipt: Mutex<Result<TxReceipt, ChainError>>,
    receipt_gate: Option<Arc<Notify>>,
    services: Mutex<HashMap<ServiceId, FakeService>>,
    blueprint_operators: Mutex<Result<Vec<Address>, ChainError>>,
    failing_reads: Mutex<bool>,
    log_feed: Mutex<Option<mpsc::UnboundedReceiver<Vec<DecodedLog>>>>,
    log_sender: mpsc::UnboundedSender<Vec<DecodedLog>>,
    filters: Mutex<Vec<LogFilter>>,
    broadcasts: AtomicUsize,
}

impl FakeChain {
    /// Chain that confirms every transaction as `tx_hash` with `logs`.
    pub fn confirming(tx_hash: &str, logs: Vec<DecodedLog>) -> Self {
        let (log_sender, log_feed) = mpsc::unbounded_channel();
        let tx_hash = hash(tx_hash);
        Self {
            receipt: Mutex::new(Ok(TxReceipt {
                hash: tx_hash.clone(),
                status: ReceiptStatus::Success,
                block_number: 7,
                logs,
                revert_reason: None,
            })),
            tx_hash,
            broadcast_error: Mutex::new(None),
            receipt_gate: None,
            services: Mutex::new(HashMap::new()),
            blueprint_operators: Mutex::new(Ok(Vec::new())),
            failing_reads: Mutex::new(false),
            log_feed: Mutex::new(Some(log_feed)),
            log_sender,
            filters: Mutex::new(Vec::new()),
            broadcasts: AtomicUsize::new(0),
        }
    }

    /// Hold receipts until the returned gate is notified.
    pub fn gate_receipts(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.receipt_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn fail_broadcast(self, message: &str) -> Self {
        *self.broadcast_error.lock() = Some(ChainError::Broadcast(message.into()));
        self
    }

    pub fn revert(self, reason: &str) -> Self {
        if let Ok(receipt) = &mut *self.receipt.lock() {
            receipt.status = ReceiptStatus::Reverted;
            receipt.revert_reason = Some(reason.into());
            receipt.logs.clear();
        }
        self
    }

    pub fn fail_receipt(self, message: &str) -> Self {
        *self.receipt.lock() = Err(ChainError::Receipt(message.into()));
        self
    }

    pub fn with_service(self, service: FakeService) -> Self {
        self.services.lock().insert(service.record.id, service);
        self
    }

    pub fn with_blueprint_operators(self, operators: Vec<Address>) -> Self {
        *self.blueprint_operators.lock() = Ok(operators);
        self
    }

    pub fn fail_reads(self) -> Self {
        *self.failing_reads.lock() = true;
        *self.blueprint_operators.lock() = Err(ChainError::Transport("connection refused".into()));
        self
    }

    /// Deliver a batch to the (single) log subscription.
    pub fn push_logs(&self, batch: Vec<DecodedLog>) {
        self.log_sender.send(batch).ok();
    }

    pub fn filters(&self) -> Vec<LogFilter> {
        self.filters.lock().clone()
    }

    pub fn broadcasts(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
    }

    fn read_guard(&self) -> Result<(), ChainError> {
        if *self.failing_reads.lock() {
            return Err(ChainError::Read("execution timeout".into()));
        }
        Ok(())
    }

    fn lookup(&self, service: ServiceId) -> Option<FakeService> {
        self.services.lock().get(&service).cloned()
    }
}

#[async_trait]
impl TxBroadcaster for FakeChain {
    async fn broadcast(&self, _tx: &SignedTx) -> Result<TxHash, ChainError> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.broadcast_error.lock().clone() {
            return Err(err);
        }
        Ok(self.tx_hash.clone())
    }

    async fn wait_for_receipt(
        &self,
        _hash: &TxHash,
        _confirmations: u64,
    ) -> Result<TxReceipt, ChainError> {
        if let Some(gate) = &self.receipt_gate {
            gate.notified().await;
        }
        self.receipt.lock().clone()
    }
}

#[async_trait]
impl ContractReader for FakeChain {
    async fn is_service_active(&self, service: ServiceId) -> Result<bool, ChainError> {
        self.read_guard()?;
        Ok(self.lookup(service).is_some_and(|s| s.active))
    }

    async fn service(&self, service: ServiceId) -> Result<Option<ServiceRecord>, ChainError> {
        self.read_guard()?;
        Ok(self.lookup(service).map(|s| s.record))
    }

    async fn service_operators(&self, service: ServiceId) -> Result<Vec<Address>, ChainError> {
        self.read_guard()?;
        Ok(self.lookup(service).map(|s| s.operators).unwrap_or_default())
    }

    async fn is_permitted_caller(
        &self,
        service: ServiceId,
        caller: &Address,
    ) -> Result<bool, ChainError> {
        self.read_guard()?;
        Ok(self
            .lookup(service)
            .is_some_and(|s| s.permitted.contains(caller)))
    }

    async fn blueprint_operators(
        &self,
        _blueprint: BlueprintId,
    ) -> Result<Vec<Address>, ChainError> {
        self.blueprint_operators.lock().clone()
    }
}

#[async_trait]
impl LogSubscriber for FakeChain {
    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<LogBatchStream, ChainError> {
        self.filters.lock().push(filter.clone());
        let Some(feed) = self.log_feed.lock().take() else {
            return Err(ChainError::Subscription("feed already taken".into()));
        };
        let stream = futures::stream::unfold(feed, |mut feed| async move {
            feed.recv().await.map(|batch| (batch, feed))
        });
        Ok(Box::pin(stream))
    }
}

// ABOUTME: Scripted operator API fake for poller and deployer tests.
// ABOUTME: Replays queued responses in order, then reports "not tracked" forever.

use async_trait::async_trait;
use parking_lot::Mutex;
use sandbox_deployer::provision::{
    ProvisionApi, ProvisionApiError, ProvisionPhase, ProvisionStatus,
};
use sandbox_deployer::types::CallId;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type Reply = Result<Option<ProvisionStatus>, ProvisionApiError>;

pub fn status(call: u64, phase: ProvisionPhase, progress: u8) -> ProvisionStatus {
    ProvisionStatus {
        correlation_id: CallId::new(call),
        resource_id: None,
        phase,
        message: None,
        started_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
        progress_percent: progress,
        endpoint_url: None,
    }
}

pub fn ready(call: u64, resource: &str) -> ProvisionStatus {
    ProvisionStatus {
        resource_id: Some(resource.to_string()),
        ..status(call, ProvisionPhase::Ready, 100)
    }
}

pub fn server_error() -> ProvisionApiError {
    ProvisionApiError::Status {
        status: 503,
        body: "unavailable".into(),
    }
}

#[derive(Default)]
pub struct ScriptedOperator {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<CallId>>,
}

impl ScriptedOperator {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Operator that answers each status in turn.
    pub fn phases(statuses: Vec<ProvisionStatus>) -> Self {
        Self::new(statuses.into_iter().map(|s| Ok(Some(s))).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<CallId> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ProvisionApi for ScriptedOperator {
    async fn fetch_status(&self, call: CallId) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(call);
        self.replies.lock().pop_front().unwrap_or(Ok(None))
    }
}

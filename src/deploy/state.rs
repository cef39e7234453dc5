// ABOUTME: The aggregate deployment state exposed to consumers.
// ABOUTME: One snapshot per change, published over a watch channel.

use super::error::DeployError;
use super::status::DeployStatus;
use crate::provision::{ProvisionResult, ProvisionStatus};
use crate::store::ResourceKind;
use crate::types::{CallId, RequestId, TxHash};
use crate::validator::ValidationError;

/// What a deployment looks like right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployState {
    pub mode: ResourceKind,
    pub status: DeployStatus,
    pub tx_hash: Option<TxHash>,
    pub error: Option<DeployError>,
    /// Job path: the call index from the receipt.
    pub call_id: Option<CallId>,
    /// New-service path: the request id from the receipt.
    pub request_id: Option<RequestId>,
    /// Set at most once per attempt.
    pub provision: Option<ProvisionResult>,
    /// Latest operator progress report (job path only).
    pub progress: Option<ProvisionStatus>,
    /// Transient poll failure, shown while polling continues.
    pub poll_error: Option<String>,
    /// Why the selected existing service cannot be used, if it can't.
    pub service_error: Option<ValidationError>,
    pub is_new_service: bool,
    pub can_deploy: bool,
}

impl DeployState {
    pub fn new(mode: ResourceKind) -> Self {
        Self {
            mode,
            status: DeployStatus::Idle,
            tx_hash: None,
            error: None,
            call_id: None,
            request_id: None,
            provision: None,
            progress: None,
            poll_error: None,
            service_error: None,
            is_new_service: mode == ResourceKind::Instance,
            can_deploy: false,
        }
    }

    /// Clear everything belonging to an attempt.
    pub(crate) fn clear_attempt(&mut self) {
        self.status = DeployStatus::Idle;
        self.tx_hash = None;
        self.error = None;
        self.call_id = None;
        self.request_id = None;
        self.provision = None;
        self.progress = None;
        self.poll_error = None;
    }
}

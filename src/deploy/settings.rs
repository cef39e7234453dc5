// ABOUTME: Static parameters for the deployer: contract, blueprint, jobs, and events.
// ABOUTME: Built from the YAML config or constructed directly by embedders and tests.

use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::types::{Address, BlueprintId, ServiceId};
use std::time::Duration;

/// Names of the services-contract events the deployer correlates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames {
    /// Emitted on job submission; its key is the call id.
    pub job_submitted: String,
    /// Emitted on service request; its key is the request id.
    pub service_requested: String,
    /// Emitted when operators approve a request; keyed by request id.
    pub service_initialized: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            job_submitted: "JobSubmitted".to_string(),
            service_requested: "ServiceRequested".to_string(),
            service_initialized: "ServiceInitialized".to_string(),
        }
    }
}

/// Everything the deployer needs that does not change between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub services_contract: Address,
    pub blueprint: BlueprintId,
    /// Shared service sandboxes are created on.
    pub sandbox_service: ServiceId,
    pub sandbox_job: u8,
    pub instance_job: u8,
    /// Value attached to job submissions, in wei.
    pub job_value: u128,
    pub ttl_blocks: u64,
    pub events: EventNames,
    pub poll_interval: Duration,
    /// Upper bound on the provisioning phase. `None` waits indefinitely.
    pub provision_timeout: Option<Duration>,
}

impl DeployConfig {
    pub fn new(
        services_contract: Address,
        blueprint: BlueprintId,
        sandbox_service: ServiceId,
    ) -> Self {
        Self {
            services_contract,
            blueprint,
            sandbox_service,
            sandbox_job: 0,
            instance_job: 0,
            job_value: 0,
            ttl_blocks: 0,
            events: EventNames::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            provision_timeout: None,
        }
    }
}

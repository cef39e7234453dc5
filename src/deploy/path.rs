// ABOUTME: Provisioning path selection based on resource kind and service state.
// ABOUTME: Determines whether to submit a job or request a new service.

use crate::store::ResourceKind;
use crate::types::ServiceId;
use crate::validator::ServiceValidation;

/// How a deployment gets its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPath {
    /// Submit a create job to a service that already exists.
    /// Completion is observed by polling the operator API.
    JobSubmission { service: ServiceId },

    /// Request a brand-new service from discovered operators.
    /// Completion is observed through the on-chain initialization event.
    NewService,
}

impl DeployPath {
    /// Pick the path for a deployment.
    ///
    /// Sandboxes always run as jobs on the shared sandbox service. Instances
    /// reuse an existing service only when it validated as usable.
    pub fn select(
        kind: ResourceKind,
        sandbox_service: ServiceId,
        existing: Option<&ServiceValidation>,
    ) -> Self {
        match kind {
            ResourceKind::Sandbox => DeployPath::JobSubmission {
                service: sandbox_service,
            },
            ResourceKind::Instance => match existing {
                Some(validation) if validation.is_usable() => DeployPath::JobSubmission {
                    service: validation.service,
                },
                _ => DeployPath::NewService,
            },
        }
    }

    pub fn is_new_service(&self) -> bool {
        matches!(self, DeployPath::NewService)
    }
}

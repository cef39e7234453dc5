// ABOUTME: Read-only contract state queries.
// ABOUTME: Used by service validation and operator discovery.

use super::ChainError;
use super::shared_types::ServiceRecord;
use crate::types::{Address, BlueprintId, ServiceId};
use async_trait::async_trait;

/// Contract state reads against the services contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Whether the service is still active (not terminated or expired).
    async fn is_service_active(&self, service: ServiceId) -> Result<bool, ChainError>;

    /// The stored service record, or `None` if no such service exists.
    async fn service(&self, service: ServiceId) -> Result<Option<ServiceRecord>, ChainError>;

    /// Operators currently serving the service.
    async fn service_operators(&self, service: ServiceId) -> Result<Vec<Address>, ChainError>;

    /// Whether `caller` may submit jobs to the service.
    async fn is_permitted_caller(
        &self,
        service: ServiceId,
        caller: &Address,
    ) -> Result<bool, ChainError>;

    /// Operators registered for a blueprint and eligible for new services.
    async fn blueprint_operators(&self, blueprint: BlueprintId)
    -> Result<Vec<Address>, ChainError>;
}

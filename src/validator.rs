// ABOUTME: Validates that an existing service can accept jobs from a caller.
// ABOUTME: Runs contract reads concurrently; a failed read counts as unknown, not fatal.

use crate::chain::{ContractReader, ServiceRecord};
use crate::types::{Address, ServiceId};
use std::sync::Arc;

/// Why a service cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Service not found")]
    NotFound,

    #[error("Service is not active")]
    NotActive,

    #[error("You are not a permitted caller for this service")]
    NotPermitted,
}

/// Everything learned about a usable service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceValidation {
    pub service: ServiceId,
    pub record: ServiceRecord,
    pub active: bool,
    pub operators: Vec<Address>,
    /// Account the permission check ran for.
    pub caller: Option<Address>,
    /// `None` when no caller was given.
    pub permitted: Option<bool>,
}

impl ServiceValidation {
    /// Active and known, with the permission check passed for a caller.
    pub fn is_usable(&self) -> bool {
        self.active && self.permitted == Some(true)
    }

    /// Usable by `account` specifically.
    pub fn is_usable_by(&self, account: Option<&Address>) -> bool {
        account.is_some() && self.caller.as_ref() == account && self.is_usable()
    }
}

/// On-demand service checks against the services contract.
pub struct ServiceValidator<R: ContractReader + ?Sized> {
    reader: Arc<R>,
}

impl<R: ContractReader + ?Sized> ServiceValidator<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Check `service` for `caller`.
    pub async fn validate(
        &self,
        service: ServiceId,
        caller: Option<&Address>,
    ) -> Result<ServiceValidation, ValidationError> {
        let permitted = async {
            match caller {
                Some(caller) => Some(self.reader.is_permitted_caller(service, caller).await),
                None => None,
            }
        };

        let (active, record, operators, permitted) = tokio::join!(
            self.reader.is_service_active(service),
            self.reader.service(service),
            self.reader.service_operators(service),
            permitted,
        );

        let active = active.unwrap_or_else(|e| {
            tracing::debug!("Active check for service {} failed: {}", service, e);
            false
        });
        let record = record.unwrap_or_else(|e| {
            tracing::debug!("Service {} lookup failed: {}", service, e);
            None
        });
        let operators = operators.unwrap_or_else(|e| {
            tracing::debug!("Operator lookup for service {} failed: {}", service, e);
            Vec::new()
        });
        let permitted = permitted.map(|result| {
            result.unwrap_or_else(|e| {
                tracing::debug!("Permission check for service {} failed: {}", service, e);
                false
            })
        });

        let Some(record) = record else {
            return Err(ValidationError::NotFound);
        };
        if !active {
            return Err(ValidationError::NotActive);
        }
        if permitted == Some(false) {
            return Err(ValidationError::NotPermitted);
        }

        Ok(ServiceValidation {
            service,
            record,
            active,
            operators,
            caller: caller.cloned(),
            permitted,
        })
    }
}

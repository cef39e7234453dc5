// ABOUTME: Persisted resource records and the upsert/update store trait.
// ABOUTME: A record is created once at confirmation and only patched afterwards.

use super::StoreError;
use crate::types::{CallId, ResourceName, ServiceId, TxHash};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of resource a deployment produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A sandbox created by a job on the shared sandbox service.
    Sandbox,
    /// A dedicated instance backed by its own service.
    Instance,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Sandbox => "sandbox",
            ResourceKind::Instance => "instance",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Creating,
    Running,
    Failed,
}

/// A locally persisted resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Store key. The resource name, unique per deployment attempt.
    pub key: String,
    pub name: ResourceName,
    pub kind: ResourceKind,
    pub status: ResourceStatus,
    pub service_id: Option<ServiceId>,
    pub call_id: Option<CallId>,
    pub tx_hash: Option<TxHash>,
    pub resource_id: Option<String>,
    pub endpoint_url: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// A freshly submitted resource, not yet provisioned.
    pub fn creating(name: ResourceName, kind: ResourceKind, image: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: name.as_str().to_string(),
            name,
            kind,
            status: ResourceStatus::Creating,
            service_id: None,
            call_id: None,
            tx_hash: None,
            resource_id: None,
            endpoint_url: None,
            image: image.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status change and partial update.
    pub fn apply(&mut self, status: ResourceStatus, patch: RecordPatch) {
        self.status = status;
        if let Some(id) = patch.resource_id {
            self.resource_id = Some(id);
        }
        if let Some(url) = patch.endpoint_url {
            self.endpoint_url = Some(url);
        }
        if let Some(service) = patch.service_id {
            self.service_id = Some(service);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields to overwrite alongside a status change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub resource_id: Option<String>,
    pub endpoint_url: Option<String>,
    pub service_id: Option<ServiceId>,
}

/// Key-value store for resource records.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Insert or replace a record by key.
    async fn upsert(&self, record: ResourceRecord) -> Result<(), StoreError>;

    /// Change the status of an existing record and apply `patch`.
    async fn update_status(
        &self,
        key: &str,
        status: ResourceStatus,
        patch: RecordPatch,
    ) -> Result<(), StoreError>;
}

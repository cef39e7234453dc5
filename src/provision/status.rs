// ABOUTME: Provision phases, status payloads, and completion results.
// ABOUTME: Phases are strictly ordered except `failed`, which any phase may reach.

use crate::types::CallId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Operator-side provisioning phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionPhase {
    Queued,
    ImagePull,
    ContainerCreate,
    ContainerStart,
    HealthCheck,
    Ready,
    Failed,
}

impl ProvisionPhase {
    /// Position in the happy-path ordering. `Failed` has none.
    pub fn rank(&self) -> Option<u8> {
        match self {
            ProvisionPhase::Queued => Some(0),
            ProvisionPhase::ImagePull => Some(1),
            ProvisionPhase::ContainerCreate => Some(2),
            ProvisionPhase::ContainerStart => Some(3),
            ProvisionPhase::HealthCheck => Some(4),
            ProvisionPhase::Ready => Some(5),
            ProvisionPhase::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisionPhase::Ready | ProvisionPhase::Failed)
    }

    /// Whether moving from `self` to `next` respects the phase ordering.
    pub fn can_advance_to(&self, next: ProvisionPhase) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to >= from,
            (None, Some(_)) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionPhase::Queued => "queued",
            ProvisionPhase::ImagePull => "image_pull",
            ProvisionPhase::ContainerCreate => "container_create",
            ProvisionPhase::ContainerStart => "container_start",
            ProvisionPhase::HealthCheck => "health_check",
            ProvisionPhase::Ready => "ready",
            ProvisionPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for ProvisionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /api/provisions/{callId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionStatus {
    #[serde(alias = "callId")]
    pub correlation_id: CallId,
    #[serde(default, alias = "sandboxId")]
    pub resource_id: Option<String>,
    pub phase: ProvisionPhase,
    #[serde(default)]
    pub message: Option<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub started_at: i64,
    /// Unix milliseconds.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub progress_percent: u8,
    #[serde(default, alias = "sidecarUrl", skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Operators may report fractional or out-of-range percentages.
fn deserialize_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if !value.is_finite() {
        return Ok(0);
    }
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

impl ProvisionStatus {
    pub fn is_ready(&self) -> bool {
        self.phase == ProvisionPhase::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.phase == ProvisionPhase::Failed
    }

    /// Progress clamped to 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress_percent.min(100)
    }
}

/// Where a completed resource lives. Set once per deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResult {
    pub resource_id: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

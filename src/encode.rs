// ABOUTME: Job argument payloads and the encoder seam.
// ABOUTME: The default encoder writes the payload as compact JSON bytes.

use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;

/// Arguments for a sandbox or instance provision job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionArgs {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub cpu_cores: u32,
    pub memory_mb: u32,
    pub disk_gb: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    pub ssh_enabled: bool,
}

/// Turns job arguments into the bytes carried by a transaction.
pub trait ArgsEncoder: Send + Sync {
    fn encode(&self, args: &ProvisionArgs) -> Result<Bytes, EncodeError>;
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to encode job arguments: {0}")]
pub struct EncodeError(pub String);

/// Encodes arguments as JSON, the format operator blueprints decode by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArgsEncoder;

impl ArgsEncoder for JsonArgsEncoder {
    fn encode(&self, args: &ProvisionArgs) -> Result<Bytes, EncodeError> {
        serde_json::to_vec(args)
            .map(Bytes::from)
            .map_err(|e| EncodeError(e.to_string()))
    }
}

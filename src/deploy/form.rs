// ABOUTME: User-entered deployment parameters.
// ABOUTME: Knows which fields are required and how to turn itself into job arguments.

use crate::encode::ProvisionArgs;
use crate::types::{ResourceName, ResourceNameError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Fields collected before a deployment can start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeployForm {
    pub name: String,
    pub image: String,
    pub stack: Option<String>,
    pub cpu_cores: u32,
    pub memory_mb: u32,
    pub disk_gb: u32,
    pub env: BTreeMap<String, String>,
    pub ssh_enabled: bool,
}

impl Default for DeployForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            stack: None,
            cpu_cores: 2,
            memory_mb: 4096,
            disk_gb: 20,
            env: BTreeMap::new(),
            ssh_enabled: false,
        }
    }
}

impl DeployForm {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Names of required fields that are empty or unusable.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.resource_name().is_err() {
            missing.push("name");
        }
        if self.image.trim().is_empty() {
            missing.push("image");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn resource_name(&self) -> Result<ResourceName, ResourceNameError> {
        ResourceName::new(&self.name)
    }

    pub fn to_args(&self, name: &ResourceName) -> ProvisionArgs {
        ProvisionArgs {
            name: name.to_string(),
            image: self.image.trim().to_string(),
            stack: self.stack.clone().filter(|s| !s.trim().is_empty()),
            cpu_cores: self.cpu_cores,
            memory_mb: self.memory_mb,
            disk_gb: self.disk_gb,
            env: self.env.clone(),
            ssh_enabled: self.ssh_enabled,
        }
    }
}

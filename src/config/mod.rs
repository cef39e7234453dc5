// ABOUTME: Configuration types and parsing for deployer.yml.
// ABOUTME: Handles YAML parsing, discovery, and conversion into deployer settings.

mod deserialize;
mod init;

pub use init::{init_config, template_yaml};

use crate::deploy::{DeployConfig, EventNames};
use crate::error::{Error, Result};
use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::provision::HttpProvisionClient;
use crate::types::{Address, BlueprintId, ServiceId};
use deserialize::deserialize_wei;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deployer.yml";
pub const CONFIG_FILENAME_ALT: &str = "deployer.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deployer/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the operator API serving provision status.
    pub operator_api: String,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default, with = "humantime_serde")]
    pub provision_timeout: Option<Duration>,

    pub contracts: ContractsConfig,

    pub blueprint_id: BlueprintId,

    pub sandbox_service_id: ServiceId,

    #[serde(default)]
    pub jobs: JobsConfig,

    /// Wei attached to job submissions. Accepts a number or a decimal string.
    #[serde(default, deserialize_with = "deserialize_wei")]
    pub job_value: u128,

    #[serde(default)]
    pub ttl_blocks: u64,

    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub services: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default)]
    pub create_sandbox: u8,
    #[serde(default = "default_instance_job")]
    pub create_instance: u8,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            create_sandbox: 0,
            create_instance: default_instance_job(),
        }
    }
}

fn default_instance_job() -> u8 {
    1
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

/// Event names, for deployments whose contract emits differently named events.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub job_submitted: String,
    pub service_requested: String,
    pub service_initialized: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        let names = EventNames::default();
        Self {
            job_submitted: names.job_submitted,
            service_requested: names.service_requested,
            service_initialized: names.service_initialized,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll_interval must be positive".into()));
        }
        if self.provision_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig("provision_timeout must be positive".into()));
        }
        let events = [
            &self.events.job_submitted,
            &self.events.service_requested,
            &self.events.service_initialized,
        ];
        if events.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::InvalidConfig("event names cannot be empty".into()));
        }
        Ok(())
    }

    /// HTTP client for the configured operator API.
    pub fn provision_client(&self) -> Result<HttpProvisionClient> {
        Ok(HttpProvisionClient::new(&self.operator_api)?)
    }

    pub fn deploy_config(&self) -> DeployConfig {
        DeployConfig {
            services_contract: self.contracts.services.clone(),
            blueprint: self.blueprint_id,
            sandbox_service: self.sandbox_service_id,
            sandbox_job: self.jobs.create_sandbox,
            instance_job: self.jobs.create_instance,
            job_value: self.job_value,
            ttl_blocks: self.ttl_blocks,
            events: EventNames {
                job_submitted: self.events.job_submitted.trim().to_string(),
                service_requested: self.events.service_requested.trim().to_string(),
                service_initialized: self.events.service_initialized.trim().to_string(),
            },
            poll_interval: self.poll_interval,
            provision_timeout: self.provision_timeout,
        }
    }
}

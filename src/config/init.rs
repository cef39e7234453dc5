// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates deployer.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::provision::HttpProvisionClient;

use super::CONFIG_FILENAME;

const DEFAULT_OPERATOR_API: &str = "http://localhost:9090";

pub fn init_config(dir: &Path, operator_api: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let operator_api = operator_api.unwrap_or(DEFAULT_OPERATOR_API);
    HttpProvisionClient::new(operator_api).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    std::fs::write(&config_path, template_yaml(operator_api))?;
    tracing::debug!("Wrote {}", config_path.display());

    Ok(())
}

pub fn template_yaml(operator_api: &str) -> String {
    format!(
        r#"operator_api: {operator_api}
poll_interval: 2s
# Give up on provisioning after this long (default: wait indefinitely)
# provision_timeout: 10m
contracts:
  services: "0x0000000000000000000000000000000000000000"
blueprint_id: 0
sandbox_service_id: 0
jobs:
  create_sandbox: 0
  create_instance: 1
job_value: 0
ttl_blocks: 0
# events:
#   job_submitted: JobSubmitted
#   service_requested: ServiceRequested
#   service_initialized: ServiceInitialized
"#
    )
}

// ABOUTME: Status command implementation.
// ABOUTME: Fetches one provision status from the operator API and prints it.

use sandbox_deployer::config::Config;
use sandbox_deployer::error::{Error, Result};
use sandbox_deployer::output::Output;
use sandbox_deployer::provision::ProvisionApi;
use sandbox_deployer::types::CallId;

/// Print the operator's current view of `call`.
pub async fn status(config: Config, call: CallId, output: Output) -> Result<()> {
    let client = config.provision_client()?;
    tracing::debug!("GET {}", client.status_path(call));

    let Some(status) = client.fetch_status(call).await? else {
        return Err(Error::ProvisionNotFound(call.value()));
    };

    output.provision(&status);
    if status.is_ready() {
        let resource = status.resource_id.as_deref().unwrap_or("unknown");
        output.success(&format!("Call {} is ready: {}", call, resource));
    }
    Ok(())
}

// ABOUTME: Watch command implementation.
// ABOUTME: Polls a provision until it reaches a terminal phase, printing each change.

use sandbox_deployer::config::Config;
use sandbox_deployer::error::{Error, Result};
use sandbox_deployer::output::Output;
use sandbox_deployer::poller::{PollState, ProvisionPoller};
use sandbox_deployer::types::CallId;
use std::sync::Arc;

/// Follow `call` until ready or failed.
pub async fn watch(config: Config, call: CallId, mut output: Output) -> Result<()> {
    let client = Arc::new(config.provision_client()?);
    output.start_timer();
    output.progress(&format!("Watching call {} on {}", call, client.base_url()));

    let mut poller = ProvisionPoller::new(client, config.poll_interval);
    let updates = poller.subscribe();
    poller.set_target(Some(call), true);

    let outcome = follow(updates, &output);
    let status = match config.provision_timeout {
        Some(limit) => tokio::time::timeout(limit, outcome)
            .await
            .map_err(|_| Error::ProvisionTimeout(limit))??,
        None => outcome.await?,
    };
    poller.stop();

    let resource = status.status.as_ref().and_then(|s| s.resource_id.clone());
    output.success(&format!(
        "Call {} is ready: {}",
        call,
        resource.as_deref().unwrap_or("unknown")
    ));
    Ok(())
}

/// Print changes until the poll state is terminal.
async fn follow(
    mut updates: tokio::sync::watch::Receiver<PollState>,
    output: &Output,
) -> Result<PollState> {
    let mut last: Option<(String, u8)> = None;
    let mut last_error: Option<String> = None;

    loop {
        let state = updates.borrow_and_update().clone();

        if let Some(status) = &state.status {
            let seen = (status.phase.as_str().to_string(), status.progress());
            if last.as_ref() != Some(&seen) {
                output.provision(status);
                last = Some(seen);
            }
            if status.is_failed() {
                let message = status.message.clone().unwrap_or_else(|| "unknown error".into());
                return Err(Error::ProvisionFailed(message));
            }
            if status.is_ready() {
                return Ok(state);
            }
        }

        if state.error != last_error {
            if let Some(error) = &state.error {
                output.warning(error);
            }
            last_error = state.error.clone();
        }

        if updates.changed().await.is_err() {
            return Err(Error::ProvisionFailed("poller stopped".into()));
        }
    }
}

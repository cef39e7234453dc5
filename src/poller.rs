// ABOUTME: Periodic polling of off-chain provision status by call id.
// ABOUTME: Polls on a fixed interval until a terminal phase, re-targeting aborts the old task.

use crate::provision::{ProvisionApi, ProvisionPhase, ProvisionStatus};
use crate::types::CallId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// What the poller has observed so far for its current call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Latest status. `None` until the operator starts tracking the call.
    pub status: Option<ProvisionStatus>,
    /// Last transient failure. Cleared by the next answer from the operator.
    pub error: Option<String>,
    /// Whether a poll task is running.
    pub polling: bool,
}

impl PollState {
    pub fn phase(&self) -> Option<ProvisionPhase> {
        self.status.as_ref().map(|s| s.phase)
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Some(ProvisionPhase::Ready)
    }

    pub fn is_failed(&self) -> bool {
        self.phase() == Some(ProvisionPhase::Failed)
    }
}

/// Polls `GET /api/provisions/{callId}` while enabled and keyed.
pub struct ProvisionPoller {
    api: Arc<dyn ProvisionApi>,
    interval: Duration,
    target: Option<CallId>,
    enabled: bool,
    state: Arc<watch::Sender<PollState>>,
    /// Bumped whenever the running task is replaced; stale tasks stop writing.
    epoch: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl ProvisionPoller {
    pub fn new(api: Arc<dyn ProvisionApi>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::default());
        Self {
            api,
            interval,
            target: None,
            enabled: false,
            state: Arc::new(state),
            epoch: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Point the poller at a call, or disable it.
    ///
    /// The running task (if any) is aborted before a new one starts. Changing
    /// the call clears previously observed status.
    pub fn set_target(&mut self, call: Option<CallId>, enabled: bool) {
        if call == self.target && enabled == self.enabled {
            return;
        }

        self.stop_task();

        if call != self.target {
            self.state.send_replace(PollState::default());
        }
        self.target = call;
        self.enabled = enabled;

        if let (true, Some(call)) = (enabled, call) {
            self.start_task(call);
        }
    }

    /// Stop polling without forgetting the last observed status.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.stop_task();
    }

    pub fn target(&self) -> Option<CallId> {
        self.target
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    pub fn is_failed(&self) -> bool {
        self.state.borrow().is_failed()
    }

    /// Whether a poll task is alive.
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn start_task(&mut self, call: CallId) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.polling = true);

        tracing::debug!("Polling provision status for call {}", call);
        self.task = Some(tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            call,
            self.interval,
            Arc::clone(&self.state),
            Arc::clone(&self.epoch),
            epoch,
        )));
    }

    fn stop_task(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state.send_if_modified(|s| std::mem::replace(&mut s.polling, false));
    }
}

impl Drop for ProvisionPoller {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Fetch on every tick until the status turns terminal.
async fn poll_loop(
    api: Arc<dyn ProvisionApi>,
    call: CallId,
    interval: Duration,
    state: Arc<watch::Sender<PollState>>,
    current_epoch: Arc<AtomicU64>,
    epoch: u64,
) {
    let is_current = || current_epoch.load(Ordering::SeqCst) == epoch;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let result = api.fetch_status(call).await;
        if !is_current() {
            return;
        }

        match result {
            Ok(None) => {
                // Not tracked yet; the operator may not have seen the job event.
                tracing::debug!("Call {} not yet tracked by operator", call);
                state.send_if_modified(|s| s.error.take().is_some());
            }
            Ok(Some(status)) => {
                let previous = state.borrow().phase();
                if let Some(previous) = previous
                    && !previous.can_advance_to(status.phase)
                {
                    tracing::debug!(
                        "Ignoring out-of-order phase {} after {} for call {}",
                        status.phase,
                        previous,
                        call
                    );
                    continue;
                }

                let terminal = status.phase.is_terminal();
                tracing::debug!(
                    "Call {} phase {} ({}%)",
                    call,
                    status.phase,
                    status.progress()
                );
                state.send_modify(|s| {
                    s.status = Some(status);
                    s.error = None;
                    if terminal {
                        s.polling = false;
                    }
                });

                if terminal {
                    tracing::info!("Provisioning for call {} reached a terminal phase", call);
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("Provision status fetch for call {} failed: {}", call, e);
                state.send_modify(|s| s.error = Some(e.to_string()));
            }
        }
    }
}

// ABOUTME: Top-level deployment state machine composing tracker, poller, and watcher.
// ABOUTME: Picks the provisioning path, mirrors progress, and writes the store at fixed points.

use super::error::DeployError;
use super::form::DeployForm;
use super::path::DeployPath;
use super::settings::DeployConfig;
use super::state::DeployState;
use super::status::{DeployEvent, DeployStatus};
use crate::chain::{ChainClient, TxRequest, Wallet};
use crate::encode::ArgsEncoder;
use crate::poller::{PollState, ProvisionPoller};
use crate::provision::{ProvisionApi, ProvisionResult};
use crate::store::{
    RecordPatch, ResourceKind, ResourceRecord, ResourceStatus, ResourceStore, TxHistory,
};
use crate::tx::{Submission, TxSnapshot, TxStatus, TxTracker};
use crate::types::{Address, CallId, RequestId, ServiceId, TxHash};
use crate::validator::{ServiceValidation, ServiceValidator};
use crate::watcher::{CompletionWatcher, WatchTarget};
use nonempty::NonEmpty;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything the deployer talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub wallet: Arc<dyn Wallet>,
    pub chain: Arc<dyn ChainClient>,
    pub provisions: Arc<dyn ProvisionApi>,
    pub store: Arc<dyn ResourceStore>,
    pub history: Arc<dyn TxHistory>,
    pub encoder: Arc<dyn ArgsEncoder>,
}

/// Caller-supplied inputs that decide whether and how to deploy.
#[derive(Debug, Default)]
struct Inputs {
    form: DeployForm,
    account: Option<Address>,
    service: Option<ServiceValidation>,
    /// `None` until discovery has run once.
    operators: Option<Vec<Address>>,
    discovering: bool,
}

impl Inputs {
    /// A validation only counts for the account it was checked against.
    fn path(&self, mode: ResourceKind, config: &DeployConfig) -> DeployPath {
        let service = self
            .service
            .as_ref()
            .filter(|s| s.is_usable_by(self.account.as_ref()));
        DeployPath::select(mode, config.sandbox_service, service)
    }

    fn has_operators(&self) -> bool {
        self.operators.as_ref().is_some_and(|ops| !ops.is_empty())
    }

    fn can_deploy(&self, state: &DeployState, config: &DeployConfig) -> bool {
        if state.status != DeployStatus::Idle
            || self.account.is_none()
            || !self.form.is_complete()
        {
            return false;
        }
        match self.path(state.mode, config) {
            DeployPath::JobSubmission { .. } => true,
            DeployPath::NewService => !self.discovering && self.has_operators(),
        }
    }
}

/// State shared between the deployer and its completion task.
///
/// Lock order: the state channel before `inputs`.
struct Shared {
    state: watch::Sender<DeployState>,
    inputs: Mutex<Inputs>,
    config: DeployConfig,
    /// Bumped per attempt and on reset; writes from older attempts are dropped.
    generation: AtomicU64,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Modify state if `generation` is still the live attempt.
    fn update(&self, generation: u64, f: impl FnOnce(&mut DeployState)) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("Dropping update from superseded deployment");
            return false;
        }
        self.state.send_modify(|state| {
            f(state);
            state.can_deploy = self.inputs.lock().can_deploy(state, &self.config);
        });
        true
    }

    /// Recompute everything derived from the inputs. The path only moves while idle.
    fn refresh_inputs(&self) {
        self.state.send_if_modified(|state| {
            let inputs = self.inputs.lock();
            let mut changed = false;
            if state.status == DeployStatus::Idle {
                let is_new_service = inputs.path(state.mode, &self.config).is_new_service();
                changed |= std::mem::replace(&mut state.is_new_service, is_new_service)
                    != is_new_service;
            }
            let can_deploy = inputs.can_deploy(state, &self.config);
            changed |= std::mem::replace(&mut state.can_deploy, can_deploy) != can_deploy;
            changed
        });
    }

    fn mirror_tx(&self, generation: u64, snapshot: &TxSnapshot) {
        self.update(generation, |state| match snapshot.status {
            TxStatus::Idle | TxStatus::Signing => {}
            TxStatus::Pending => {
                state.tx_hash = snapshot.hash.clone();
                advance(state, DeployEvent::Broadcast);
            }
            TxStatus::Confirmed => advance(state, DeployEvent::Confirm),
            TxStatus::Failed => {
                state.error = snapshot.error.clone().map(DeployError::from);
                advance(state, DeployEvent::Fail);
            }
        });
    }

    fn mirror_progress(&self, generation: u64, poll: &PollState) {
        self.update(generation, |state| {
            state.progress = poll.status.clone();
            state.poll_error = poll.error.clone();
        });
    }
}

fn advance(state: &mut DeployState, event: DeployEvent) {
    match state.status.advance(event) {
        Ok(next) => {
            tracing::debug!("Deployment {} -> {}", state.status, next);
            state.status = next;
        }
        Err(e) => tracing::debug!("Ignoring {}", e),
    }
}

/// How the completion task decides the attempt is done.
#[derive(Debug, Clone)]
enum Completion {
    Poll { call: CallId },
    Watch { request: RequestId },
}

/// Everything `deploy()` decided before the wallet prompt opened.
struct Attempt {
    generation: u64,
    path: DeployPath,
    submission: Submission,
    record: ResourceRecord,
}

/// Drives one deployment at a time from form to running resource.
pub struct Deployer {
    deps: Collaborators,
    tracker: TxTracker<dyn ChainClient>,
    shared: Arc<Shared>,
    completion: Mutex<Option<JoinHandle<()>>>,
}

impl Deployer {
    pub fn new(config: DeployConfig, deps: Collaborators, mode: ResourceKind) -> Self {
        let tracker = TxTracker::new(
            Arc::clone(&deps.wallet),
            Arc::clone(&deps.chain),
            Arc::clone(&deps.history),
        );
        let (state, _) = watch::channel(DeployState::new(mode));
        Self {
            deps,
            tracker,
            shared: Arc::new(Shared {
                state,
                inputs: Mutex::new(Inputs::default()),
                config,
                generation: AtomicU64::new(0),
            }),
            completion: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.shared.config
    }

    pub fn state(&self) -> DeployState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeployState> {
        self.shared.state.subscribe()
    }

    pub fn can_deploy(&self) -> bool {
        self.shared.state.borrow().can_deploy
    }

    pub fn set_form(&self, form: DeployForm) {
        self.shared.inputs.lock().form = form;
        self.shared.refresh_inputs();
    }

    /// Connect or disconnect the signing account.
    ///
    /// A service validated for another account (or none) does not carry
    /// over; call [`Deployer::refresh_service`] again after switching.
    pub fn set_account(&self, account: Option<Address>) {
        self.shared.inputs.lock().account = account;
        self.shared.refresh_inputs();
    }

    /// Switch between sandbox and instance. Ignored unless idle.
    pub fn set_mode(&self, mode: ResourceKind) -> bool {
        let shared = &self.shared;
        shared.state.send_if_modified(|state| {
            if state.status != DeployStatus::Idle || state.mode == mode {
                return false;
            }
            let inputs = shared.inputs.lock();
            state.mode = mode;
            state.is_new_service = inputs.path(mode, &shared.config).is_new_service();
            state.can_deploy = inputs.can_deploy(state, &shared.config);
            true
        })
    }

    /// Validate an existing service for instance deployments, or clear it.
    pub async fn refresh_service(&self, service: Option<ServiceId>) {
        let outcome = match service {
            Some(service) => {
                let account = self.shared.inputs.lock().account.clone();
                let validator = ServiceValidator::new(Arc::clone(&self.deps.chain));
                Some(validator.validate(service, account.as_ref()).await)
            }
            None => None,
        };

        let shared = &self.shared;
        shared.state.send_modify(|state| {
            let mut inputs = shared.inputs.lock();
            match outcome {
                Some(Ok(validation)) => {
                    tracing::debug!("Service {} is usable", validation.service);
                    inputs.service = Some(validation);
                    state.service_error = None;
                }
                Some(Err(e)) => {
                    tracing::debug!("Service rejected: {}", e);
                    inputs.service = None;
                    state.service_error = Some(e);
                }
                None => {
                    inputs.service = None;
                    state.service_error = None;
                }
            }
            if state.status == DeployStatus::Idle {
                state.is_new_service = inputs.path(state.mode, &shared.config).is_new_service();
            }
            state.can_deploy = inputs.can_deploy(state, &shared.config);
        });
    }

    /// Look up the blueprint's registered operators.
    ///
    /// A failed lookup counts as no operators.
    pub async fn discover_operators(&self) -> Vec<Address> {
        self.shared.inputs.lock().discovering = true;
        self.shared.refresh_inputs();

        let blueprint = self.shared.config.blueprint;
        let operators = self
            .deps
            .chain
            .blueprint_operators(blueprint)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Operator discovery for blueprint {} failed: {}", blueprint, e);
                Vec::new()
            });
        tracing::debug!("Discovered {} operators", operators.len());

        {
            let mut inputs = self.shared.inputs.lock();
            inputs.operators = Some(operators.clone());
            inputs.discovering = false;
        }
        self.shared.refresh_inputs();
        operators
    }

    /// Start a deployment with the current inputs.
    ///
    /// Returns the confirmed transaction hash, or `None` if nothing was sent
    /// or the transaction failed. Provisioning continues in the background;
    /// follow it through [`Deployer::subscribe`].
    pub async fn deploy(&self) -> Option<TxHash> {
        let attempt = self.begin()?;
        let Attempt {
            generation,
            path,
            submission,
            mut record,
        } = attempt;
        let shared = Arc::clone(&self.shared);

        let hash = self
            .tracker
            .submit(submission, |snapshot| shared.mirror_tx(generation, snapshot))
            .await?;
        if !shared.is_current(generation) {
            return None;
        }

        let correlation = self.tracker.call_id();
        record.tx_hash = Some(hash.clone());
        let completion = match path {
            DeployPath::JobSubmission { service } => {
                record.service_id = Some(service);
                record.call_id = correlation.map(CallId::new);
                correlation.map(|id| Completion::Poll {
                    call: CallId::new(id),
                })
            }
            DeployPath::NewService => correlation.map(|id| Completion::Watch {
                request: RequestId::new(id),
            }),
        };

        let key = record.key.clone();
        if let Err(e) = self.deps.store.upsert(record).await {
            tracing::warn!("Failed to save resource {}: {}", key, e);
        }

        let Some(completion) = completion else {
            tracing::warn!("No correlation id in receipt for {}", hash);
            mark_failed(&self.deps.store, &key).await;
            shared.update(generation, |state| {
                state.error = Some(DeployError::MissingCallId);
                advance(state, DeployEvent::Fail);
            });
            return Some(hash);
        };

        let started = shared.update(generation, |state| {
            match &completion {
                Completion::Poll { call } => state.call_id = Some(*call),
                Completion::Watch { request } => state.request_id = Some(*request),
            }
            advance(state, DeployEvent::StartProvisioning);
        });
        if !started {
            return Some(hash);
        }

        tracing::info!("Transaction {} confirmed, waiting for {}", hash, key);
        let task = tokio::spawn(run_completion(
            Arc::clone(&shared),
            self.deps.clone(),
            completion,
            key,
            generation,
        ));
        if let Some(previous) = self.completion.lock().replace(task) {
            previous.abort();
        }

        Some(hash)
    }

    /// Discard the current attempt and return to idle.
    ///
    /// Idle without an error is left alone.
    pub fn reset(&self) {
        {
            let state = self.shared.state.borrow();
            if state.status == DeployStatus::Idle && state.error.is_none() {
                return;
            }
        }

        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.completion.lock().take() {
            task.abort();
        }
        self.tracker.reset();

        let shared = &self.shared;
        shared.state.send_modify(|state| {
            state.clear_attempt();
            advance(state, DeployEvent::Reset);
            let inputs = shared.inputs.lock();
            state.is_new_service = inputs.path(state.mode, &shared.config).is_new_service();
            state.can_deploy = inputs.can_deploy(state, &shared.config);
        });
        tracing::debug!("Deployment reset");
    }

    /// Check preconditions, build the transaction, and claim `signing`.
    fn begin(&self) -> Option<Attempt> {
        let shared = &self.shared;
        let config = &shared.config;
        let mut attempt = None;

        shared.state.send_if_modified(|state| {
            if state.status != DeployStatus::Idle {
                return false;
            }
            let inputs = shared.inputs.lock();
            let Some(account) = inputs.account.clone() else {
                return false;
            };
            let Ok(name) = inputs.form.resource_name() else {
                return false;
            };
            if !inputs.form.is_complete() {
                return false;
            }

            let path = inputs.path(state.mode, config);
            tracing::info!("Deploying {} {} via {:?}", state.mode, name, path);

            let operators = match path {
                DeployPath::NewService if inputs.discovering => return false,
                DeployPath::NewService => {
                    let found = inputs.operators.clone().and_then(NonEmpty::from_vec);
                    if found.is_none() {
                        tracing::warn!("No operators available for blueprint {}", config.blueprint);
                        state.error = Some(DeployError::NoOperators);
                        state.can_deploy = false;
                        return true;
                    }
                    found
                }
                DeployPath::JobSubmission { .. } => None,
            };

            let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.clear_attempt();
            state.is_new_service = path.is_new_service();
            state.can_deploy = false;

            let args = inputs.form.to_args(&name);
            let encoded = match self.deps.encoder.encode(&args) {
                Ok(encoded) => encoded,
                Err(e) => {
                    tracing::warn!("{}", e);
                    state.error = Some(DeployError::Encode(e.to_string()));
                    advance(state, DeployEvent::Fail);
                    return true;
                }
            };

            let (request, event) = match (path, operators) {
                (DeployPath::JobSubmission { service }, _) => {
                    let job = match state.mode {
                        ResourceKind::Sandbox => config.sandbox_job,
                        ResourceKind::Instance => config.instance_job,
                    };
                    let request = TxRequest::submit_job(
                        config.services_contract.clone(),
                        service,
                        job,
                        encoded,
                        config.job_value,
                    );
                    (request, &config.events.job_submitted)
                }
                (DeployPath::NewService, Some(operators)) => {
                    let request = TxRequest::request_service(
                        config.services_contract.clone(),
                        config.blueprint,
                        operators,
                        encoded,
                        vec![account],
                        config.ttl_blocks,
                    );
                    (request, &config.events.service_requested)
                }
                (DeployPath::NewService, None) => return true,
            };

            advance(state, DeployEvent::Sign);
            attempt = Some(Attempt {
                generation,
                path,
                submission: Submission::new(request, event.clone()),
                record: ResourceRecord::creating(name, state.mode, inputs.form.image.trim()),
            });
            true
        });

        attempt
    }
}

impl Drop for Deployer {
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.completion.get_mut().take() {
            task.abort();
        }
    }
}

/// Wait for the resource, then write the final record and status.
async fn run_completion(
    shared: Arc<Shared>,
    deps: Collaborators,
    completion: Completion,
    key: String,
    generation: u64,
) {
    let outcome = wait_for_resource(&shared, &deps, completion.clone(), generation);
    let outcome = match shared.config.provision_timeout {
        Some(limit) => tokio::time::timeout(limit, outcome)
            .await
            .unwrap_or(Err(DeployError::ProvisionTimeout(limit))),
        None => outcome.await,
    };

    if !shared.is_current(generation) {
        return;
    }

    match outcome {
        Ok(result) => {
            let service_id = match completion {
                Completion::Watch { .. } => result.resource_id.parse().ok().map(ServiceId::new),
                Completion::Poll { .. } => None,
            };
            let patch = RecordPatch {
                resource_id: Some(result.resource_id.clone()),
                endpoint_url: result.endpoint_url.clone(),
                service_id,
            };
            if let Err(e) = deps
                .store
                .update_status(&key, ResourceStatus::Running, patch)
                .await
            {
                tracing::warn!("Failed to update resource {}: {}", key, e);
            }

            tracing::info!("{} is running as {}", key, result.resource_id);
            shared.update(generation, |state| {
                if state.provision.is_none() {
                    state.provision = Some(result);
                }
                advance(state, DeployEvent::Resolve);
            });
        }
        Err(e) => {
            tracing::warn!("Provisioning {} failed: {}", key, e);
            mark_failed(&deps.store, &key).await;
            shared.update(generation, |state| {
                state.error = Some(e);
                advance(state, DeployEvent::Fail);
            });
        }
    }
}

async fn wait_for_resource(
    shared: &Shared,
    deps: &Collaborators,
    completion: Completion,
    generation: u64,
) -> Result<ProvisionResult, DeployError> {
    match completion {
        Completion::Poll { call } => {
            let mut poller =
                ProvisionPoller::new(Arc::clone(&deps.provisions), shared.config.poll_interval);
            let mut updates = poller.subscribe();
            poller.set_target(Some(call), true);

            loop {
                let poll = updates.borrow_and_update().clone();
                shared.mirror_progress(generation, &poll);

                if let Some(status) = poll.status {
                    if status.is_ready() {
                        return Ok(ProvisionResult {
                            resource_id: status.resource_id.unwrap_or_else(|| call.to_string()),
                            endpoint_url: status.endpoint_url,
                        });
                    }
                    if status.is_failed() {
                        let message = status
                            .message
                            .unwrap_or_else(|| "operator reported failure".to_string());
                        return Err(DeployError::ProvisionFailed(message));
                    }
                }

                if updates.changed().await.is_err() {
                    return Err(DeployError::ProvisionFailed(
                        "status updates stopped".to_string(),
                    ));
                }
            }
        }
        Completion::Watch { request } => {
            let target = WatchTarget {
                contract: shared.config.services_contract.clone(),
                event: shared.config.events.service_initialized.clone(),
            };
            let mut watcher = CompletionWatcher::new(Arc::clone(&deps.chain), target)
                .with_retry_delay(shared.config.poll_interval);
            let mut updates = watcher.subscribe();
            watcher.set_target(Some(request.to_string()), true);

            let found = updates
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|result| result.clone());
            found.ok_or_else(|| DeployError::ProvisionFailed("event stream closed".to_string()))
        }
    }
}

async fn mark_failed(store: &Arc<dyn ResourceStore>, key: &str) {
    if let Err(e) = store
        .update_status(key, ResourceStatus::Failed, RecordPatch::default())
        .await
    {
        tracing::warn!("Failed to update resource {}: {}", key, e);
    }
}

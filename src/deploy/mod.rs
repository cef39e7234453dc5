// ABOUTME: Deployment orchestration: path selection, unified status, and store side effects.
// ABOUTME: Exports the Deployer and the state it publishes.

mod error;
mod form;
mod orchestrator;
mod path;
mod settings;
mod state;
mod status;

pub use error::{DeployError, DeployErrorKind};
pub use form::DeployForm;
pub use orchestrator::{Collaborators, Deployer};
pub use path::DeployPath;
pub use settings::{DeployConfig, EventNames};
pub use state::DeployState;
pub use status::{DeployEvent, DeployStatus, InvalidTransition};

// ABOUTME: Off-chain provisioning progress as reported by the operator API.
// ABOUTME: Status vocabulary, completion results, and the HTTP status client.

mod client;
mod error;
mod status;

pub use client::{HttpProvisionClient, PROVISIONS_PATH, ProvisionApi};
pub use error::{ProvisionApiError, ProvisionApiErrorKind};
pub use status::{ProvisionPhase, ProvisionResult, ProvisionStatus};

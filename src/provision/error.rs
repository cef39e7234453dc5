// ABOUTME: Operator API error types with SNAFU pattern.
// ABOUTME: Every variant is transient from the poller's point of view.

use snafu::Snafu;
use std::time::Duration;

/// Errors from fetching provision status over HTTP.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProvisionApiError {
    #[snafu(display("invalid operator API url {url}: {reason}"))]
    InvalidUrl { url: String, reason: String },

    #[snafu(display("unsupported URL scheme {scheme}: only http is supported"))]
    UnsupportedScheme { scheme: String },

    #[snafu(display("failed to connect to {authority}: {source}"))]
    Connect {
        authority: String,
        source: std::io::Error,
    },

    #[snafu(display("HTTP request failed: {source}"))]
    Http { source: hyper::Error },

    #[snafu(display("failed to build request: {reason}"))]
    Request { reason: String },

    #[snafu(display("request timed out after {after:?}"))]
    Timeout { after: Duration },

    #[snafu(display("operator API returned {status}: {body}"))]
    Status { status: u16, body: String },

    #[snafu(display("invalid status payload: {source}"))]
    Decode { source: serde_json::Error },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionApiErrorKind {
    /// The client was configured with an unusable URL.
    Configuration,
    /// Connection, transport, or timeout failure.
    Network,
    /// The operator answered with a non-success status.
    Server,
    /// The operator answered with a body we could not read.
    Decode,
}

impl ProvisionApiError {
    pub fn kind(&self) -> ProvisionApiErrorKind {
        match self {
            ProvisionApiError::InvalidUrl { .. }
            | ProvisionApiError::UnsupportedScheme { .. }
            | ProvisionApiError::Request { .. } => ProvisionApiErrorKind::Configuration,
            ProvisionApiError::Connect { .. }
            | ProvisionApiError::Http { .. }
            | ProvisionApiError::Timeout { .. } => ProvisionApiErrorKind::Network,
            ProvisionApiError::Status { .. } => ProvisionApiErrorKind::Server,
            ProvisionApiError::Decode { .. } => ProvisionApiErrorKind::Decode,
        }
    }
}

// ABOUTME: The unified deployment status and its transition function.
// ABOUTME: Illegal moves are rejected, so status can only advance or fail.

use std::fmt;

/// Single source of truth for what a deployment is doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeployStatus {
    #[default]
    Idle,
    Signing,
    Pending,
    Confirmed,
    Provisioning,
    Ready,
    Failed,
}

/// Something that happened to a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployEvent {
    /// Wallet prompt opened.
    Sign,
    /// Signed transaction broadcast.
    Broadcast,
    /// Receipt received.
    Confirm,
    /// Completion strategy started.
    StartProvisioning,
    /// Completion strategy resolved.
    Resolve,
    Fail,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition: {event:?} while {from}")]
pub struct InvalidTransition {
    pub from: DeployStatus,
    pub event: DeployEvent,
}

impl DeployStatus {
    /// Apply `event`, returning the next status.
    pub fn advance(self, event: DeployEvent) -> Result<DeployStatus, InvalidTransition> {
        use DeployEvent as E;
        use DeployStatus as S;

        match (self, event) {
            (_, E::Reset) => Ok(S::Idle),
            (S::Idle, E::Sign) => Ok(S::Signing),
            (S::Signing, E::Broadcast) => Ok(S::Pending),
            (S::Pending, E::Confirm) => Ok(S::Confirmed),
            (S::Confirmed, E::StartProvisioning) => Ok(S::Provisioning),
            (S::Provisioning, E::Resolve) => Ok(S::Ready),
            (from, E::Fail) if !from.is_terminal() => Ok(S::Failed),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployStatus::Ready | DeployStatus::Failed)
    }

    /// Position along the happy path. `Failed` has none.
    pub fn rank(&self) -> Option<u8> {
        match self {
            DeployStatus::Idle => Some(0),
            DeployStatus::Signing => Some(1),
            DeployStatus::Pending => Some(2),
            DeployStatus::Confirmed => Some(3),
            DeployStatus::Provisioning => Some(4),
            DeployStatus::Ready => Some(5),
            DeployStatus::Failed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Idle => "idle",
            DeployStatus::Signing => "signing",
            DeployStatus::Pending => "pending",
            DeployStatus::Confirmed => "confirmed",
            DeployStatus::Provisioning => "provisioning",
            DeployStatus::Ready => "ready",
            DeployStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

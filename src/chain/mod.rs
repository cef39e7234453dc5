// ABOUTME: Blockchain collaborator capabilities consumed by the deployer.
// ABOUTME: Signing, broadcasting, contract reads, and log subscriptions are injected.

pub mod traits;

pub use traits::*;

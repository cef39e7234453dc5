// ABOUTME: Library root for sandbox-deployer - exposes the deployment engine and its collaborators.
// ABOUTME: The CLI binary is in main.rs.

pub mod chain;
pub mod config;
pub mod deploy;
pub mod encode;
pub mod error;
pub mod output;
pub mod poller;
pub mod provision;
pub mod store;
pub mod tx;
pub mod types;
pub mod validator;
pub mod watcher;

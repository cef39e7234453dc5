// ABOUTME: Command module aggregator for the deployer CLI.
// ABOUTME: Re-exports status and watch command handlers.

mod status;
mod watch;

pub use status::status;
pub use watch::watch;

// ABOUTME: Test support utilities.
// ABOUTME: Provides in-memory chain, wallet, and operator fakes for integration tests.

use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod chain;
#[allow(dead_code)]
pub mod http;
#[allow(dead_code)]
pub mod operator;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("sandbox_deployer=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Address with `last` as its final byte.
#[allow(dead_code)]
pub fn addr(last: u8) -> sandbox_deployer::types::Address {
    format!("0x{:040x}", last).parse().unwrap()
}

/// Address of the services contract used throughout the tests.
#[allow(dead_code)]
pub fn services_contract() -> sandbox_deployer::types::Address {
    addr(0x90)
}

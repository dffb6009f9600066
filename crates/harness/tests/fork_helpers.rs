//! Fork test helper utilities for harness integration tests.

use crv_optimizer_harness::{Fork, ForkConfig};

/// Install a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Spawns a forked anvil from environment configuration.
///
/// Returns `None` if `ETH_RPC_URL` is not set.
pub fn spawn_fork() -> Option<(Fork, ForkConfig)> {
    init_tracing();

    let Some(config) = ForkConfig::from_env() else {
        eprintln!("Skipping test: ETH_RPC_URL not set");
        return None;
    };

    let fork = Fork::spawn(&config).expect("Failed to spawn Anvil");
    Some((fork, config))
}

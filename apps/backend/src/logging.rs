//! Structured logging initialization for the embedding process.
//!
//! Idempotent and race-safe: repeated calls are no-ops, and `try_init` is
//! tolerated failing when the host already installed a subscriber. The
//! level comes from `RUST_LOG`, defaulting to `info`.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("RUST_LOG")
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt().with_env_filter(filter).try_init().ok();
    });
}

/// Test variant: quieter default, output routed through the test writer so
/// cargo captures it per test.
pub fn init_for_tests() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

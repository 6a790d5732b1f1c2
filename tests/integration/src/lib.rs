//! S3 conformance scenarios.
//!
//! These tests need a running S3-compatible endpoint described by the INI
//! file named in `S3TESTS_INI` (default `s3tests.ini`). They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! S3TESTS_INI=./s3tests.ini cargo test -p s3tests-integration -- --ignored
//! ```

use std::sync::{Arc, Once, OnceLock};

use s3tests_core::S3Config;
use s3tests_fixture::TestContext;

static INIT: Once = Once::new();
static CONFIG: OnceLock<Arc<S3Config>> = OnceLock::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Settings shared by every test, loaded on first use.
#[must_use]
pub fn config() -> Arc<S3Config> {
    init_tracing();
    Arc::clone(CONFIG.get_or_init(|| {
        Arc::new(S3Config::load().unwrap_or_else(|e| panic!("failed to load s3tests config: {e}")))
    }))
}

/// Fresh context for one test. Call `teardown()` when the test is done.
#[must_use]
pub fn context() -> TestContext {
    TestContext::new(config())
}

mod test_backend;
mod test_bucket;
mod test_checksum;
mod test_copy;
mod test_cors;
mod test_error;
mod test_list;
mod test_policy;
mod test_post;
mod test_presigned;
mod test_sse;
mod test_tagging;
mod test_versioning;

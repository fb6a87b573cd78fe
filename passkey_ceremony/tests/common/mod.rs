pub mod mock_portal;

pub use fixtures::*;
pub use mock_portal::MockPortal;

use std::sync::Once;

/// Load `.env_test` (falling back to `.env`) and install a tracing subscriber, once.
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "passkey_ceremony=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

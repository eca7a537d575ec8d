// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and appstack builders shared by integration tests.

use std::sync::Once;

use cfstack::appstack::AppConfig;
use cfstack::types::AppName;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("cfstack=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// An application with nothing but a name.
#[allow(dead_code)]
pub fn app(name: &str) -> AppConfig {
    AppConfig::new(AppName::new(name).unwrap())
}

/// Application names in list order.
#[allow(dead_code)]
pub fn names(apps: &[AppConfig]) -> Vec<&str> {
    apps.iter().map(|a| a.name.as_str()).collect()
}

/// Helper functions for E2E tests.
/// Provides utilities to check whether E2E tests can run (data source available).
use super::env::get_test_config;
use smsd_odbc::engine::{Connector, OdbcConnector};
use smsd_odbc::test_helpers::load_dotenv;

/// Checks whether the configured data source accepts a connection.
#[allow(dead_code)]
pub fn can_connect() -> bool {
    load_dotenv();

    let config = match get_test_config() {
        Some(config) => config,
        None => return false,
    };

    match OdbcConnector.connect(&config) {
        Ok(_session) => {
            eprintln!("[OK] Connected to data source {}", config.host);
            true
        }
        Err(e) => {
            eprintln!("[ERROR] Connection failed: {}", e);
            eprintln!("  Data source: {}", config.host);
            false
        }
    }
}

/// Checks whether E2E tests should run.
/// Runs only when ENABLE_E2E_TESTS is explicitly enabled.
#[allow(dead_code)]
pub fn should_run_e2e_tests() -> bool {
    load_dotenv();

    let enabled = std::env::var("ENABLE_E2E_TESTS")
        .ok()
        .as_deref()
        .and_then(smsd_odbc::string_to_bool)
        == Some(true);

    if !enabled {
        return false;
    }

    can_connect()
}

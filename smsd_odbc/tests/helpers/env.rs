//! Helper functions for reading environment variables in tests

use smsd_odbc::BackendConfig;

/// Get the SMSD_ODBC_TEST_DSN data source name from environment
/// Returns None if not set (tests should be skipped in this case)
pub fn get_test_dsn() -> Option<String> {
    std::env::var("SMSD_ODBC_TEST_DSN")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Backend configuration for E2E tests, built from SMSD_ODBC_TEST_DSN,
/// SMSD_ODBC_TEST_USER and SMSD_ODBC_TEST_PASSWORD
pub fn get_test_config() -> Option<BackendConfig> {
    let dsn = get_test_dsn()?;
    let user = std::env::var("SMSD_ODBC_TEST_USER").unwrap_or_default();
    let password = std::env::var("SMSD_ODBC_TEST_PASSWORD").unwrap_or_default();

    Some(BackendConfig::new(dsn, user, &password).with_login_timeout(10))
}

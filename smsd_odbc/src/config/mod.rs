use crate::error::{OdbcError, Result};
use crate::security::Secret;
use serde::Deserialize;

pub const HOST_ENV: &str = "SMSD_ODBC_HOST";
pub const USER_ENV: &str = "SMSD_ODBC_USER";
pub const PASSWORD_ENV: &str = "SMSD_ODBC_PASSWORD";
pub const LOGIN_TIMEOUT_ENV: &str = "SMSD_ODBC_LOGIN_TIMEOUT";

/// Connection settings for one configured backend.
///
/// `host` is handed to the driver manager as the data source name; `user`
/// and `password` go to SQLConnect unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: Secret,
    #[serde(default)]
    pub login_timeout_sec: Option<u32>,
}

impl BackendConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: &str) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: Secret::new(password),
            login_timeout_sec: None,
        }
    }

    pub fn with_login_timeout(mut self, timeout_secs: u32) -> Self {
        self.login_timeout_sec = Some(timeout_secs);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(OdbcError::EmptyDataSourceName);
        }
        Ok(())
    }

    /// Reads `SMSD_ODBC_HOST`, `SMSD_ODBC_USER`, `SMSD_ODBC_PASSWORD` and
    /// `SMSD_ODBC_LOGIN_TIMEOUT`. Only the host is required.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(HOST_ENV).unwrap_or_default();
        let user = std::env::var(USER_ENV).unwrap_or_default();
        let password = std::env::var(PASSWORD_ENV).unwrap_or_default();
        let login_timeout_sec = match std::env::var(LOGIN_TIMEOUT_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u32>().map_err(|_| {
                OdbcError::ValidationError(format!("{} is not a number: {}", LOGIN_TIMEOUT_ENV, raw))
            })?),
            _ => None,
        };

        let config = Self {
            host,
            user,
            password: Secret::new(password),
            login_timeout_sec,
        };
        config.validate()?;
        Ok(config)
    }
}

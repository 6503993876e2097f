use super::environment::OdbcEnvironment;
use super::query::execute_direct;
use super::session::{Connector, Session};
use super::statement::QueryResult;
use crate::config::BackendConfig;
use crate::error::Result;
use odbc_api::{Connection, ConnectionOptions};

/// Connects through the process-wide environment with SQLConnect.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcConnector;

impl Connector for OdbcConnector {
    type Session = OdbcSession;

    fn connect(&self, config: &BackendConfig) -> Result<OdbcSession> {
        config.validate()?;

        let env = OdbcEnvironment::shared()?;
        let opts = ConnectionOptions {
            login_timeout_sec: config.login_timeout_sec,
            ..ConnectionOptions::default()
        };
        let connection = env.environment().connect(
            &config.host,
            &config.user,
            config.password.expose(),
            opts,
        )?;

        Ok(OdbcSession { connection })
    }
}

pub struct OdbcSession {
    connection: Connection<'static>,
}

impl Session for OdbcSession {
    fn execute(&self, sql: &str) -> Result<QueryResult<'_>> {
        execute_direct(&self.connection, sql)
    }

    fn is_dead(&self) -> bool {
        self.connection.is_dead().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdbcError;

    #[test]
    fn test_connect_rejects_empty_host_before_touching_odbc() {
        let config = BackendConfig::new("", "user1", "pw1");
        let result = OdbcConnector.connect(&config);
        assert!(matches!(result, Err(OdbcError::EmptyDataSourceName)));
    }

    #[test]
    #[ignore]
    fn test_connect_unknown_dsn_fails_with_diagnostics() {
        let config = BackendConfig::new("smsd_odbc_no_such_dsn", "user1", "pw1");
        let err = match OdbcConnector.connect(&config) {
            Ok(_) => panic!("connecting to an unknown DSN must fail"),
            Err(e) => e,
        };
        assert!(!err.diagnostics().is_empty());
        assert!(err.is_connection_error());
    }
}

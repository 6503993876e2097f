use crate::error::{OdbcError, Result};
use odbc_api::Environment;
use std::sync::OnceLock;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Process-wide ODBC environment (SQL_ATTR_ODBC_VERSION = 3), created on
/// first use and shared by every backend. ODBC expects one environment per
/// process, so it is never torn down; connections release their own handles.
#[derive(Clone, Copy)]
pub struct OdbcEnvironment {
    env: &'static Environment,
}

impl OdbcEnvironment {
    /// A failed allocation is not remembered; the next call tries again.
    pub fn shared() -> Result<Self> {
        let env = init_once(&ENVIRONMENT, || {
            Environment::new().map_err(|e| {
                OdbcError::Allocation(format!("Failed to create ODBC environment: {}", e))
            })
        })?;
        Ok(Self { env })
    }

    pub fn environment(&self) -> &'static Environment {
        self.env
    }
}

// Only a successful value is stored. When two callers race, the loser's
// value is dropped and both get the winner's.
fn init_once<T>(
    cell: &'static OnceLock<T>,
    create: impl FnOnce() -> Result<T>,
) -> Result<&'static T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let _ = cell.set(create()?);
    cell.get()
        .ok_or_else(|| OdbcError::InternalError("ODBC environment not initialized".to_string()))
}

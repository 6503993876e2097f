pub mod cell_reader;
pub mod connection;
pub mod environment;
pub mod query;
pub mod session;
pub mod statement;

pub use connection::{OdbcConnector, OdbcSession};
pub use environment::OdbcEnvironment;
pub use query::{execute_direct, OdbcRows};
pub use session::{Connector, Session};
pub use statement::{QueryResult, RowSource};

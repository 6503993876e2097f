pub mod scripted;

pub use scripted::{diagnostics, text, ScriptedConnector, ScriptedRows, ScriptedSession};

/// Loads a `.env` file from the working directory if one exists.
#[cfg(feature = "test-helpers")]
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

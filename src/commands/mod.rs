//! Command handlers for the finapp CLI.

mod append;
mod auth;
mod dashboard;
mod init;

pub use append::append;
pub use auth::auth;
pub use dashboard::dashboard;
pub use init::init;

use serde::Serialize;
use std::fmt::Debug;
use tracing::warn;

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the `structure`, if any.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Prints the message, then the structure as pretty JSON when present.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = &self.structure {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("Unable to serialize command output: {e}"),
            }
        }
    }
}

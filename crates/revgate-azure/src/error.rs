//! Error types for the platform command layer.

use thiserror::Error;

/// Errors from executing or interpreting a platform command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn platform command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("platform command failed (exit code {code:?}): {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("platform command terminated by signal {signal:?}")]
    Terminated {
        command: String,
        signal: Option<i32>,
    },

    #[error("could not parse {what} output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} output was empty")]
    EmptyOutput { what: &'static str },
}

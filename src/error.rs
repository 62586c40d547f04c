use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExplorerError>;

/// The pool operation a disagreement was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    UnspentOutputs,
    Broadcast,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::UnspentOutputs => write!(f, "unspent outputs"),
            Operation::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// One failed backend inside a pool call, labelled with the backend's name.
#[derive(Debug)]
pub struct BackendFailure {
    pub explorer: String,
    pub error: ExplorerError,
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server returned status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("explorers returned conflicting {operation} results")]
    Disagreement { operation: Operation },

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("{}", render_failures(.0))]
    BackendFailures(Vec<BackendFailure>),
}

fn render_failures(failures: &[BackendFailure]) -> String {
    let summaries = failures
        .iter()
        .map(|failure| format!("{}: {}", failure.explorer, failure.error))
        .collect::<Vec<_>>();

    format!(
        "{} explorer request(s) failed: {}",
        failures.len(),
        summaries.join("; ")
    )
}

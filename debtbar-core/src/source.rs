//! The remote entry store, as seen from the client.

use thiserror::Error;

use crate::entry::{Direction, LedgerEntry};

/// Message shown when this identity already has an entry in the ledger.
pub const ALREADY_CONTRIBUTED: &str = "You have already made a change to the debt!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Network or store unreachable
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
    /// The store answered with a server-side failure
    #[error("{message}")]
    Fault {
        message: String,
        detail: Option<String>,
    },
}

/// Result of an append the store actually answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Accepted { message: String },
    /// Expected rejection: this identity already changed the ledger
    AlreadyContributed { message: String },
}

impl AppendOutcome {
    pub fn message(&self) -> &str {
        match self {
            AppendOutcome::Accepted { message } | AppendOutcome::AlreadyContributed { message } => {
                message
            }
        }
    }
}

/// Read/append access to the ledger. Fetch and append are the only
/// suspension points in the client.
#[allow(async_fn_in_trait)]
pub trait LedgerSource {
    async fn fetch_all(&self) -> Result<Vec<LedgerEntry>, SourceError>;

    async fn append(&self, direction: Direction) -> Result<AppendOutcome, SourceError>;
}

//! debtbar-client: HTTP access to the remote ledger store

pub mod http;

pub use http::{classify_append, classify_fetch, HttpLedgerSource};

//! In-memory ledger store with the same one-change-per-identity rule as the
//! remote store. Used offline and in tests.

use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use tracing::debug;

use crate::entry::{Direction, EntryId, LedgerEntry};
use crate::source::{AppendOutcome, LedgerSource, SourceError, ALREADY_CONTRIBUTED};

#[derive(Debug)]
pub struct MemoryLedger {
    entries: RefCell<Vec<LedgerEntry>>,
    /// Identity of the caller, as the store would derive it
    identity: RefCell<String>,
    clock: Cell<DateTime<Utc>>,
    fetches: Cell<usize>,
    appends: Cell<usize>,
    unavailable: Cell<bool>,
    /// Server-side failure message returned instead of an answer
    fault: RefCell<Option<String>>,
}

impl MemoryLedger {
    pub fn new(identity: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            identity: RefCell::new(identity.into()),
            clock: Cell::new(now),
            fetches: Cell::new(0),
            appends: Cell::new(0),
            unavailable: Cell::new(false),
            fault: RefCell::new(None),
        }
    }

    pub fn with_entries(self, entries: Vec<LedgerEntry>) -> Self {
        *self.entries.borrow_mut() = entries;
        self
    }

    /// Seed an entry directly, bypassing the identity check
    pub fn seed(&self, entry: LedgerEntry) {
        self.entries.borrow_mut().push(entry);
    }

    pub fn set_identity(&self, identity: impl Into<String>) {
        *self.identity.borrow_mut() = identity.into();
    }

    /// Timestamp given to the next appended entry
    pub fn set_clock(&self, now: DateTime<Utc>) {
        self.clock.set(now);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn set_fault(&self, message: Option<String>) {
        *self.fault.borrow_mut() = message;
    }

    fn check_reachable(&self) -> Result<(), SourceError> {
        if self.unavailable.get() {
            return Err(SourceError::Unavailable("memory ledger switched off".to_string()));
        }
        if let Some(message) = self.fault.borrow().clone() {
            return Err(SourceError::Fault {
                message,
                detail: None,
            });
        }
        Ok(())
    }

    /// Number of fetch requests that reached the store
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    /// Number of append requests that reached the store
    pub fn append_count(&self) -> usize {
        self.appends.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl LedgerSource for MemoryLedger {
    async fn fetch_all(&self) -> Result<Vec<LedgerEntry>, SourceError> {
        self.fetches.set(self.fetches.get() + 1);
        self.check_reachable()?;
        Ok(self.entries.borrow().clone())
    }

    async fn append(&self, direction: Direction) -> Result<AppendOutcome, SourceError> {
        self.appends.set(self.appends.get() + 1);
        self.check_reachable()?;

        let identity = self.identity.borrow().clone();
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|e| e.origin == identity) {
            debug!(%identity, "rejecting second change from identity");
            return Ok(AppendOutcome::AlreadyContributed {
                message: ALREADY_CONTRIBUTED.to_string(),
            });
        }

        let next_id = entries.len() as i64 + 1;
        let entry = LedgerEntry::new(
            EntryId::Num(next_id),
            direction.amount(),
            direction.description(),
            self.clock.get(),
            identity,
        )
        .map_err(|e| SourceError::Fault {
            message: "Error inserting debt data".to_string(),
            detail: Some(e.to_string()),
        })?;
        entries.push(entry);

        let message = match direction {
            Direction::Add => "Debt Added Successfully, Thanks a lot...",
            Direction::Remove => "Debt Removed Successfully, Thanks a lot...",
        };
        Ok(AppendOutcome::Accepted {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn second_change_from_same_identity_is_rejected() {
        let ledger = MemoryLedger::new("10.0.0.1", now());

        let first = ledger.append(Direction::Add).await.unwrap();
        assert!(matches!(first, AppendOutcome::Accepted { .. }));

        let second = ledger.append(Direction::Remove).await.unwrap();
        assert_eq!(
            second,
            AppendOutcome::AlreadyContributed {
                message: ALREADY_CONTRIBUTED.to_string()
            }
        );
        assert_eq!(ledger.len(), 1);

        ledger.set_identity("10.0.0.2");
        let third = ledger.append(Direction::Remove).await.unwrap();
        assert_eq!(third.message(), "Debt Removed Successfully, Thanks a lot...");

        let entries = ledger.fetch_all().await.unwrap();
        assert_eq!(entries.iter().map(|e| e.amount).sum::<i64>(), 0);
        assert_eq!(ledger.fetch_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_requests() {
        let ledger = MemoryLedger::new("x", now());
        ledger.set_unavailable(true);
        assert!(matches!(ledger.fetch_all().await, Err(SourceError::Unavailable(_))));
        assert!(matches!(ledger.append(Direction::Add).await, Err(SourceError::Unavailable(_))));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn faulted_store_reports_its_message() {
        let ledger = MemoryLedger::new("x", now());
        ledger.set_fault(Some("Error fetching debt data".to_string()));
        let fault = SourceError::Fault {
            message: "Error fetching debt data".to_string(),
            detail: None,
        };
        assert_eq!(ledger.fetch_all().await, Err(fault.clone()));
        assert_eq!(ledger.append(Direction::Add).await, Err(fault));
        assert!(ledger.is_empty());

        ledger.set_fault(None);
        assert!(ledger.fetch_all().await.is_ok());
    }
}

//! Ledger entry types: one signed contribution event per row in the store.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier. The store hands out integers, but text ids are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum EntryId {
    Num(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Num(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        EntryId::Num(n)
    }
}

impl From<i32> for EntryId {
    fn from(n: i32) -> Self {
        EntryId::Num(n.into())
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId::Text(s.to_string())
    }
}

/// One immutable ledger entry.
///
/// `amount` is never zero: construction and deserialization both reject it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawEntry")]
pub struct LedgerEntry {
    pub id: EntryId,
    /// Positive = debt added, negative = debt paid off
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Identity token of the contributor (the store derives it from the network origin)
    #[serde(rename = "user_ip")]
    pub origin: String,
}

#[derive(Deserialize)]
struct RawEntry {
    id: EntryId,
    amount: i64,
    #[serde(default)]
    description: String,
    created_at: DateTime<Utc>,
    #[serde(default, rename = "user_ip", alias = "origin")]
    origin: Option<String>,
}

impl TryFrom<RawEntry> for LedgerEntry {
    type Error = anyhow::Error;

    fn try_from(raw: RawEntry) -> Result<Self> {
        LedgerEntry::new(
            raw.id,
            raw.amount,
            raw.description,
            raw.created_at,
            raw.origin.unwrap_or_default(),
        )
    }
}

impl LedgerEntry {
    /// Create a new entry, rejecting a zero amount.
    pub fn new(
        id: impl Into<EntryId>,
        amount: i64,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
        origin: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if amount == 0 {
            bail!("ledger entry {id} has a zero amount");
        }
        Ok(Self {
            id,
            amount,
            description: description.into(),
            created_at,
            origin: origin.into(),
        })
    }

    /// Returns true if this entry adds debt
    pub fn is_addition(&self) -> bool {
        self.amount > 0
    }

    /// Returns true if this entry pays debt off
    pub fn is_removal(&self) -> bool {
        self.amount < 0
    }

    pub fn abs_amount(&self) -> u64 {
        self.amount.unsigned_abs()
    }
}

/// Direction of a single-step mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "remove")]
    Remove,
}

impl Direction {
    pub fn amount(&self) -> i64 {
        match self {
            Direction::Add => 1,
            Direction::Remove => -1,
        }
    }

    /// Reason text the store records for a user-initiated change
    pub fn description(&self) -> &'static str {
        match self {
            Direction::Add => "Added by User",
            Direction::Remove => "Removed by User",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_amount_rejected() {
        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert!(LedgerEntry::new(1, 0, "nothing", t, "1.2.3.4").is_err());

        let e = LedgerEntry::new(1, -3, "paid", t, "1.2.3.4").unwrap();
        assert!(e.is_removal());
        assert_eq!(e.abs_amount(), 3);
    }

    #[test]
    fn test_parse_store_row() {
        let json = r#"{
            "id": 42,
            "amount": 1,
            "description": "Added by User",
            "created_at": "2025-03-01T18:30:00.123456+00:00",
            "user_ip": "10.0.0.7"
        }"#;
        let e: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.id, EntryId::Num(42));
        assert_eq!(e.origin, "10.0.0.7");
        assert!(e.is_addition());
    }

    #[test]
    fn test_parse_row_with_origin_key() {
        let json = r#"{"id":"7","amount":-2,"description":"Beat a level","created_at":"2025-03-01T18:30:00Z","origin":"10.0.0.9"}"#;
        let e: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.origin, "10.0.0.9");
        assert_eq!(e.id, EntryId::Text("7".to_string()));

        let missing = r#"{"id":8,"amount":1,"created_at":"2025-03-01T18:30:00Z"}"#;
        let e: LedgerEntry = serde_json::from_str(missing).unwrap();
        assert_eq!(e.origin, "");
        assert_eq!(e.description, "");
    }

    #[test]
    fn test_parse_rejects_zero_amount() {
        let json = r#"{"id":"a","amount":0,"description":"x","created_at":"2025-03-01T18:30:00Z"}"#;
        assert!(serde_json::from_str::<LedgerEntry>(json).is_err());
    }

    #[test]
    fn test_serialized_entry_reads_back() {
        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let e = LedgerEntry::new("abc", 258, "Initial debt", t, "").unwrap();
        let s = serde_json::to_string(&e).unwrap();
        assert!(s.contains("\"user_ip\""));
        let back: LedgerEntry = serde_json::from_str(&s).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_direction_amounts() {
        assert_eq!(Direction::Add.amount(), 1);
        assert_eq!(Direction::Remove.amount(), -1);
        assert_eq!(Direction::Remove.description(), "Removed by User");
    }
}

//! debtbar-core: ledger aggregation, caching and view derivation for the debt tracker

pub mod aggregate;
pub mod cache;
pub mod entry;
pub mod format;
pub mod gate;
pub mod log;
pub mod memory_ledger;
pub mod render;
pub mod series;
pub mod source;
pub mod store;
pub mod tracker;

pub use aggregate::{aggregate, AggregateResult, DEFAULT_INITIAL_DEBT};
pub use cache::{CacheRecord, LedgerCache, DEFAULT_TTL_SECS};
pub use entry::{Direction, EntryId, LedgerEntry};
pub use format::UnitNoun;
pub use gate::MutationGate;
pub use log::{build_log, CollapseRule, CollapseRules, CollapsedRow, DisplayRow, DEFAULT_PAGE_SIZE};
pub use memory_ledger::MemoryLedger;
pub use render::{RecordingSink, RenderSink, Status};
pub use series::{build_series, SeriesPoint};
pub use source::{AppendOutcome, LedgerSource, SourceError, ALREADY_CONTRIBUTED};
pub use store::{KeyValueStore, MemoryStore};
pub use tracker::{DebtTracker, Loaded, TrackerConfig};

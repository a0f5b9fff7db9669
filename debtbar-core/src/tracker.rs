//! DebtTracker: wires cache, store, gate and the three view builders together.
//!
//! Activation consults the cache first and only goes to the store on a miss.
//! The fetched entry set is the only state the builders share; each view is
//! derived from it independently. Mutations pass through the gate, then the
//! store, then invalidate the cache.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, AggregateResult, DEFAULT_INITIAL_DEBT};
use crate::cache::LedgerCache;
use crate::entry::{Direction, LedgerEntry};
use crate::gate::MutationGate;
use crate::log::{build_log, CollapseRules, DisplayRow, DEFAULT_PAGE_SIZE};
use crate::render::{RenderSink, Status};
use crate::series::{build_series, SeriesPoint};
use crate::source::{AppendOutcome, LedgerSource, SourceError, ALREADY_CONTRIBUTED};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    pub initial: i64,
    pub page_size: usize,
    pub collapse: CollapseRules,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_DEBT,
            page_size: DEFAULT_PAGE_SIZE,
            collapse: CollapseRules::default(),
        }
    }
}

/// Where the entries behind the current view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    Cached,
    Fetched,
    /// Fetch failed; showing the last good entry set
    Stale,
    /// Fetch failed and there is nothing to show
    Unavailable,
}

pub struct DebtTracker<L: LedgerSource, S: KeyValueStore> {
    source: L,
    cache: LedgerCache<S>,
    gate: MutationGate<S>,
    config: TrackerConfig,
    entries: Option<Vec<LedgerEntry>>,
    display_full: bool,
}

impl<L: LedgerSource, S: KeyValueStore + Clone> DebtTracker<L, S> {
    pub fn new(source: L, store: S, ttl: Duration, config: TrackerConfig) -> Self {
        Self {
            source,
            cache: LedgerCache::new(store.clone(), ttl),
            gate: MutationGate::new(store),
            config,
            entries: None,
            display_full: false,
        }
    }
}

impl<L: LedgerSource, S: KeyValueStore> DebtTracker<L, S> {
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn source(&self) -> &L {
        &self.source
    }

    pub fn entries(&self) -> Option<&[LedgerEntry]> {
        self.entries.as_deref()
    }

    pub fn display_full(&self) -> bool {
        self.display_full
    }

    pub fn can_mutate(&self) -> bool {
        self.gate.can_mutate()
    }

    /// Load entries (cache first, store on miss) and render every view.
    pub async fn activate(&mut self, now: DateTime<Utc>, sink: &mut impl RenderSink) -> Loaded {
        if let Some(entries) = self.cache.load(now) {
            self.entries = Some(entries);
            self.render(sink);
            return Loaded::Cached;
        }

        debug!("cache miss; fetching entries from store");
        match self.source.fetch_all().await {
            Ok(entries) => {
                info!(entries = entries.len(), "fetched ledger entries");
                self.cache.store(&entries, now);
                self.entries = Some(entries);
                self.render(sink);
                Loaded::Fetched
            }
            Err(e) => {
                warn!("fetching entries failed: {e}");
                sink.render_status(&error_status(&e));

                if self.entries.is_none() {
                    self.entries = self.cache.peek().map(|record| record.entries);
                }
                if self.entries.is_some() {
                    self.render(sink);
                    Loaded::Stale
                } else {
                    Loaded::Unavailable
                }
            }
        }
    }

    /// Drop the cache and activate again.
    pub async fn refresh(&mut self, now: DateTime<Utc>, sink: &mut impl RenderSink) -> Loaded {
        self.cache.invalidate();
        self.activate(now, sink).await
    }

    /// Render progress, log and series from the entries in hand.
    pub fn render(&self, sink: &mut impl RenderSink) {
        let Some(entries) = self.entries.as_deref() else {
            return;
        };
        sink.render_progress(&aggregate(entries, self.config.initial));
        sink.render_log(&self.build_log(entries));
        sink.render_series(&build_series(entries, self.config.initial));
    }

    /// Switch between the paged and the full log. Never touches the store.
    pub fn set_display_full(&mut self, display_full: bool, sink: &mut impl RenderSink) {
        self.display_full = display_full;
        if let Some(entries) = self.entries.as_deref() {
            sink.render_log(&self.build_log(entries));
        }
    }

    pub fn progress(&self) -> Option<AggregateResult> {
        self.entries
            .as_deref()
            .map(|entries| aggregate(entries, self.config.initial))
    }

    pub fn log_rows(&self) -> Option<Vec<DisplayRow>> {
        self.entries.as_deref().map(|entries| self.build_log(entries))
    }

    pub fn series(&self) -> Option<Vec<SeriesPoint>> {
        self.entries
            .as_deref()
            .map(|entries| build_series(entries, self.config.initial))
    }

    /// Ask the store to move the ledger one step in `direction`.
    ///
    /// A closed gate answers locally without a request.
    pub async fn contribute(&mut self, direction: Direction, sink: &mut impl RenderSink) -> Status {
        if !self.gate.can_mutate() {
            info!(?direction, "gate closed; skipping request");
            let status = Status::AlreadyContributed {
                message: ALREADY_CONTRIBUTED.to_string(),
            };
            sink.render_status(&status);
            return status;
        }

        let status = match self.source.append(direction).await {
            Ok(outcome) => {
                self.gate.after_mutation_attempt(&outcome, &self.cache);
                match outcome {
                    AppendOutcome::Accepted { message } => Status::Accepted { message },
                    AppendOutcome::AlreadyContributed { message } => {
                        Status::AlreadyContributed { message }
                    }
                }
            }
            Err(e) => {
                warn!(?direction, "append failed: {e}");
                error_status(&e)
            }
        };

        sink.render_status(&status);
        status
    }

    fn build_log(&self, entries: &[LedgerEntry]) -> Vec<DisplayRow> {
        build_log(
            entries,
            self.display_full,
            self.config.page_size,
            &self.config.collapse,
        )
    }
}

fn error_status(e: &SourceError) -> Status {
    match e {
        SourceError::Unavailable(_) => Status::Unavailable {
            reason: e.to_string(),
        },
        SourceError::Fault { message, .. } => Status::Fault {
            message: message.clone(),
        },
    }
}

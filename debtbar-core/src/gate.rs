//! Mutation gate: at most one change per identity, as seen from this client.
//!
//! The flag only saves a pointless round trip. The store's identity check is
//! the real enforcement; nothing here is a security boundary.

use tracing::{info, warn};

use crate::cache::LedgerCache;
use crate::source::AppendOutcome;
use crate::store::KeyValueStore;

pub const CONTRIBUTED_KEY: &str = "voted";

#[derive(Debug, Clone)]
pub struct MutationGate<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> MutationGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// False once the store has told us this identity already contributed.
    /// A flag that cannot be read does not block.
    pub fn can_mutate(&self) -> bool {
        match self.store.get(CONTRIBUTED_KEY) {
            Ok(Some(v)) => v != "true",
            Ok(None) => true,
            Err(e) => {
                warn!("reading contribution flag failed: {e:#}");
                true
            }
        }
    }

    /// Record what the store said about an append.
    ///
    /// - already contributed: set the flag for good
    /// - accepted: invalidate `cache` so the next read refetches
    pub fn after_mutation_attempt<C: KeyValueStore>(
        &self,
        outcome: &AppendOutcome,
        cache: &LedgerCache<C>,
    ) {
        match outcome {
            AppendOutcome::AlreadyContributed { .. } => {
                info!("store reports identity already contributed; closing gate");
                if let Err(e) = self.store.set(CONTRIBUTED_KEY, "true") {
                    warn!("persisting contribution flag failed: {e:#}");
                }
            }
            AppendOutcome::Accepted { .. } => {
                info!("change accepted; invalidating cached entries");
                cache.invalidate();
            }
        }
    }
}

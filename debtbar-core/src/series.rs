//! Running-total time series for charting the remaining debt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::LedgerEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    /// Debt left after this entry: `initial + added so far - removed so far`
    pub remaining: i64,
    pub description: String,
    pub amount: i64,
}

/// One point per entry, oldest first. Each point already includes its own entry.
pub fn build_series(entries: &[LedgerEntry], initial: i64) -> Vec<SeriesPoint> {
    let mut sorted: Vec<&LedgerEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.created_at);

    let mut cum_added: u64 = 0;
    let mut cum_removed: u64 = 0;

    sorted
        .into_iter()
        .map(|e| {
            if e.is_addition() {
                cum_added = cum_added.saturating_add(e.abs_amount());
            } else {
                cum_removed = cum_removed.saturating_add(e.abs_amount());
            }
            SeriesPoint {
                timestamp: e.created_at,
                remaining: initial
                    .saturating_add_unsigned(cum_added)
                    .saturating_sub_unsigned(cum_removed),
                description: e.description.clone(),
                amount: e.amount,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn entry(id: i64, amount: i64, secs: i64) -> LedgerEntry {
        LedgerEntry::new(id, amount, format!("e{id}"), at(secs), "").unwrap()
    }

    #[test]
    fn test_prefix_sum() {
        let points = build_series(&[entry(1, 5, 1), entry(2, -3, 2)], 10);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, at(1));
        assert_eq!(points[0].remaining, 15);
        assert_eq!(points[1].timestamp, at(2));
        assert_eq!(points[1].remaining, 12);
    }

    #[test]
    fn test_sorted_ascending_one_point_per_entry() {
        let entries = vec![entry(1, -1, 30), entry(2, 2, 10), entry(3, -4, 20), entry(4, 1, 10)];
        let points = build_series(&entries, 100);

        assert_eq!(points.len(), entries.len());
        for w in points.windows(2) {
            assert!(w[0].timestamp <= w[1].timestamp);
        }
        // equal timestamps keep input order
        assert_eq!(points[0].description, "e2");
        assert_eq!(points[1].description, "e4");
        assert_eq!(
            points.iter().map(|p| p.remaining).collect::<Vec<_>>(),
            vec![102, 103, 99, 98]
        );
    }

    #[test]
    fn test_empty() {
        assert!(build_series(&[], 258).is_empty());
    }
}

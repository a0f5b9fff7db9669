//! Progress aggregation: added/removed totals and the completion percentage.

use serde::{Deserialize, Serialize};

use crate::entry::LedgerEntry;
use crate::format::UnitNoun;

/// Debt the tracker starts from before any entry is recorded.
pub const DEFAULT_INITIAL_DEBT: i64 = 258;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AggregateResult {
    pub total_added: u64,
    pub total_removed: u64,
    pub initial: i64,
    /// In [0, 100], one decimal place
    pub percent_complete: f64,
    /// Set when `initial + total_added` is not positive and the percentage
    /// could not be computed (reported as 0)
    pub undefined: bool,
}

impl AggregateResult {
    /// Total debt accumulated so far: initial plus everything added
    pub fn goal(&self) -> i64 {
        self.initial.saturating_add_unsigned(self.total_added)
    }

    pub fn remaining(&self) -> i64 {
        self.goal().saturating_sub_unsigned(self.total_removed)
    }

    pub fn headline(&self) -> String {
        format!("I am {:.1}% Free!", self.percent_complete)
    }

    pub fn counter_label(&self, unit: &UnitNoun) -> String {
        format!(
            "{}/{} {} Completed",
            self.total_removed,
            self.goal(),
            unit.plural
        )
    }
}

/// Reduce `entries` to totals and a completion percentage.
///
/// Never divides by zero: a non-positive denominator reports 0 and sets
/// `undefined`. Removals beyond the accumulated debt clamp to 100.
pub fn aggregate(entries: &[LedgerEntry], initial: i64) -> AggregateResult {
    let (total_added, total_removed) =
        entries
            .iter()
            .fold((0u64, 0u64), |(added, removed), e| {
                if e.is_addition() {
                    (added.saturating_add(e.abs_amount()), removed)
                } else {
                    (added, removed.saturating_add(e.abs_amount()))
                }
            });

    let denominator = initial.saturating_add_unsigned(total_added);
    let (percent_complete, undefined) = if denominator <= 0 {
        (0.0, true)
    } else {
        let pct = total_removed as f64 / denominator as f64 * 100.0;
        (round1(pct).clamp(0.0, 100.0), false)
    };

    AggregateResult {
        total_added,
        total_removed,
        initial,
        percent_complete,
        undefined,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, amount: i64) -> LedgerEntry {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        LedgerEntry::new(id, amount, "x", t, "").unwrap()
    }

    #[test]
    fn test_empty_set_is_zero_percent() {
        let r = aggregate(&[], DEFAULT_INITIAL_DEBT);
        assert_eq!(r.total_added, 0);
        assert_eq!(r.total_removed, 0);
        assert_eq!(r.percent_complete, 0.0);
        assert!(!r.undefined);
    }

    #[test]
    fn test_additions_only() {
        let r = aggregate(&[entry(1, 258)], 0);
        assert_eq!(r.total_added, 258);
        assert_eq!(r.total_removed, 0);
        assert_eq!(r.percent_complete, 0.0);
    }

    #[test]
    fn test_mixed_rounds_to_one_decimal() {
        let r = aggregate(&[entry(1, 10), entry(2, -5)], 258);
        assert_eq!(r.total_added, 10);
        assert_eq!(r.total_removed, 5);
        assert_eq!(r.percent_complete, 1.9);
        assert_eq!(r.goal(), 268);
        assert_eq!(r.remaining(), 263);
    }

    #[test]
    fn test_zero_denominator_reports_zero() {
        let r = aggregate(&[], 0);
        assert_eq!(r.percent_complete, 0.0);
        assert!(r.undefined);

        let r = aggregate(&[entry(1, -4)], 0);
        assert_eq!(r.total_removed, 4);
        assert_eq!(r.percent_complete, 0.0);
        assert!(r.undefined);
        assert!(r.percent_complete.is_finite());
    }

    #[test]
    fn test_overpayment_clamps_to_hundred() {
        let r = aggregate(&[entry(1, -30)], 10);
        assert_eq!(r.percent_complete, 100.0);
        assert_eq!(r.remaining(), -20);
    }

    #[test]
    fn test_labels() {
        let r = aggregate(&[entry(1, 10), entry(2, -5)], 258);
        assert_eq!(r.headline(), "I am 1.9% Free!");
        assert_eq!(r.counter_label(&UnitNoun::default()), "5/268 Games Completed");
    }
}

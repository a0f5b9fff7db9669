//! Log builder: the display log, newest first, with noisy categories collapsed.
//!
//! Rules:
//! - entries are sorted by `created_at` descending; equal timestamps keep
//!   their fetched order
//! - entries whose description matches a collapse rule are merged into one
//!   synthetic row per rule, pinned above everything else in rule order
//! - ordinary entries are cut to `page_size` unless the full log is requested
//!
//! Building is pure. Flipping between the paged and full log re-derives from
//! the entry set already in hand.

use serde::{Deserialize, Serialize};

use crate::entry::LedgerEntry;
use crate::format::{row_text, UnitNoun};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Date label shown for collapsed rows, whose members span many timestamps
pub const UNKNOWN_DATE: &str = "unknown";

/// Maps one repeating description to the summary shown in its place.
/// `{count}` in `summary` is replaced by the number of merged entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollapseRule {
    pub description: String,
    pub summary: String,
}

impl CollapseRule {
    pub fn new(description: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            summary: summary.into(),
        }
    }

    /// Case-insensitive, whitespace-trimmed match on the description
    pub fn matches(&self, description: &str) -> bool {
        self.description.trim().eq_ignore_ascii_case(description.trim())
    }

    pub fn render_summary(&self, count: usize) -> String {
        self.summary.replace("{count}", &count.to_string())
    }
}

/// Ordered rule table; declaration order is display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CollapseRules(Vec<CollapseRule>);

impl Default for CollapseRules {
    fn default() -> Self {
        Self(vec![
            CollapseRule::new("Played Support Game.", "Played Support Game {count} Times."),
            CollapseRule::new("Random Number Gen Bet.", "Ran Random Number Gen {count} Times."),
        ])
    }
}

impl CollapseRules {
    pub fn new(rules: Vec<CollapseRule>) -> Self {
        Self(rules)
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn rules(&self) -> &[CollapseRule] {
        &self.0
    }

    /// Index of the first rule matching `description`
    pub fn position(&self, description: &str) -> Option<usize> {
        self.0.iter().position(|r| r.matches(description))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollapsedRow {
    /// Description of the rule that produced this row
    pub rule: String,
    pub count: usize,
    /// Sum of member amounts
    pub amount: i64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayRow {
    Entry(LedgerEntry),
    Collapsed(CollapsedRow),
}

impl DisplayRow {
    pub fn amount(&self) -> i64 {
        match self {
            DisplayRow::Entry(e) => e.amount,
            DisplayRow::Collapsed(c) => c.amount,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, DisplayRow::Collapsed(_))
    }

    pub fn text(&self, unit: &UnitNoun) -> String {
        match self {
            DisplayRow::Entry(e) => row_text(e.amount, &e.description, unit),
            DisplayRow::Collapsed(c) => row_text(c.amount, &c.summary, unit),
        }
    }

    pub fn date_label(&self) -> String {
        match self {
            DisplayRow::Entry(e) => e.created_at.format("%Y-%m-%d %H:%M").to_string(),
            DisplayRow::Collapsed(_) => UNKNOWN_DATE.to_string(),
        }
    }
}

/// Build the display log from `entries` without touching them.
pub fn build_log(
    entries: &[LedgerEntry],
    display_full: bool,
    page_size: usize,
    rules: &CollapseRules,
) -> Vec<DisplayRow> {
    let mut sorted: Vec<&LedgerEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    // groups[i] = (count, amount) for rules()[i]
    let mut groups: Vec<(usize, i64)> = vec![(0, 0); rules.rules().len()];
    let mut ordinary: Vec<&LedgerEntry> = Vec::new();

    for e in sorted {
        match rules.position(&e.description) {
            Some(i) => {
                groups[i].0 += 1;
                groups[i].1 = groups[i].1.saturating_add(e.amount);
            }
            None => ordinary.push(e),
        }
    }

    let mut rows: Vec<DisplayRow> = rules
        .rules()
        .iter()
        .zip(groups)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(rule, (count, amount))| {
            DisplayRow::Collapsed(CollapsedRow {
                rule: rule.description.clone(),
                count,
                amount,
                summary: rule.render_summary(count),
            })
        })
        .collect();

    let visible = if display_full {
        ordinary.len()
    } else {
        page_size.min(ordinary.len())
    };
    rows.extend(
        ordinary
            .into_iter()
            .take(visible)
            .map(|e| DisplayRow::Entry(e.clone())),
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(id: i64, amount: i64, description: &str, minute: i64) -> LedgerEntry {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minute);
        LedgerEntry::new(id, amount, description, t, "").unwrap()
    }

    fn sample() -> Vec<LedgerEntry> {
        vec![
            entry(1, 1, "Added by User", 1),
            entry(2, -1, "Played Support Game.", 2),
            entry(3, -2, "Beat a boss", 3),
            entry(4, 5, "Random Number Gen Bet.", 4),
            entry(5, -1, "Played Support Game.", 5),
            entry(6, 1, "Added by User", 6),
            entry(7, -1, "Removed by User", 7),
        ]
    }

    fn ids(rows: &[DisplayRow]) -> Vec<String> {
        rows.iter()
            .filter_map(|r| match r {
                DisplayRow::Entry(e) => Some(e.id.to_string()),
                DisplayRow::Collapsed(_) => None,
            })
            .collect()
    }

    #[test]
    fn collapsed_rows_pinned_in_rule_order() {
        let rows = build_log(&sample(), true, 10, &CollapseRules::default());

        let DisplayRow::Collapsed(first) = &rows[0] else { panic!("expected collapsed row") };
        assert_eq!(first.rule, "Played Support Game.");
        assert_eq!(first.count, 2);
        assert_eq!(first.amount, -2);
        assert_eq!(first.summary, "Played Support Game 2 Times.");

        let DisplayRow::Collapsed(second) = &rows[1] else { panic!("expected collapsed row") };
        assert_eq!(second.count, 1);
        assert_eq!(second.amount, 5);
        assert_eq!(second.summary, "Ran Random Number Gen 1 Times.");

        assert_eq!(ids(&rows), vec!["7", "6", "3", "1"]);
        assert_eq!(rows[0].date_label(), UNKNOWN_DATE);
    }

    #[test]
    fn page_size_truncates_only_ordinary_rows() {
        let rules = CollapseRules::default();
        let paged = build_log(&sample(), false, 2, &rules);
        assert_eq!(paged.len(), 4);
        assert_eq!(ids(&paged), vec!["7", "6"]);

        let full = build_log(&sample(), true, 2, &rules);
        assert!(ids(&full).len() > ids(&paged).len());

        let collapsed = |rows: &[DisplayRow]| -> Vec<DisplayRow> {
            rows.iter().filter(|r| r.is_collapsed()).cloned().collect()
        };
        assert_eq!(collapsed(&paged), collapsed(&full));
    }

    #[test]
    fn toggle_leaves_count_equal_when_within_page() {
        let rules = CollapseRules::none();
        let paged = build_log(&sample(), false, 50, &rules);
        let full = build_log(&sample(), true, 50, &rules);
        assert_eq!(paged, full);
    }

    #[test]
    fn repeated_builds_are_identical_and_input_untouched() {
        let entries = sample();
        let before = entries.clone();
        let rules = CollapseRules::default();

        let a = build_log(&entries, false, 3, &rules);
        let b = build_log(&entries, false, 3, &rules);
        assert_eq!(a, b);
        assert_eq!(entries, before);
    }

    #[test]
    fn equal_timestamps_keep_fetched_order() {
        let entries = vec![
            entry(1, 1, "first", 0),
            entry(2, 1, "second", 0),
            entry(3, 1, "third", 0),
        ];
        let rows = build_log(&entries, true, 10, &CollapseRules::none());
        assert_eq!(ids(&rows), vec!["1", "2", "3"]);
    }

    #[test]
    fn rule_matching_ignores_case_and_padding() {
        let rule = CollapseRule::new("Played Support Game.", "x");
        assert!(rule.matches("  played support game. "));
        assert!(!rule.matches("Played Support Game"));
    }

    #[test]
    fn row_text_uses_summary_for_collapsed_rows() {
        let unit = UnitNoun::default();
        let rows = build_log(&sample(), false, 1, &CollapseRules::default());
        assert_eq!(rows[0].text(&unit), "-2 Games - Played Support Game 2 Times.");
        assert_eq!(rows[2].text(&unit), "-1 Game - Removed By User");
    }
}

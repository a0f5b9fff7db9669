//! Text formatting shared by the log rows and progress labels.

use serde::{Deserialize, Serialize};

/// The thing being counted, e.g. "Game" / "Games".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitNoun {
    pub singular: String,
    pub plural: String,
}

impl Default for UnitNoun {
    fn default() -> Self {
        Self {
            singular: "Game".to_string(),
            plural: "Games".to_string(),
        }
    }
}

impl UnitNoun {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Singular only when the magnitude is exactly one
    pub fn for_amount(&self, amount: i64) -> &str {
        if amount.unsigned_abs() == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// `+3` for positive amounts, `-3` for negative ones.
pub fn signed_amount(amount: i64) -> String {
    if amount > 0 {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}

/// Capitalize the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// One log line: `+2 Games - Played Support Game.`
pub fn row_text(amount: i64, description: &str, unit: &UnitNoun) -> String {
    format!(
        "{} {} - {}",
        signed_amount(amount),
        unit.for_amount(amount),
        title_case(description)
    )
}

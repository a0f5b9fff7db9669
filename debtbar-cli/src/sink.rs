//! Terminal rendering of the tracker views.

use debtbar_core::{AggregateResult, DisplayRow, RenderSink, SeriesPoint, Status, UnitNoun};
use tracing::warn;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Views {
    pub progress: bool,
    pub log: bool,
    pub series: bool,
}

impl Views {
    pub const ALL: Views = Views {
        progress: true,
        log: true,
        series: true,
    };
    pub const NONE: Views = Views {
        progress: false,
        log: false,
        series: false,
    };
}

pub struct TerminalSink {
    unit: UnitNoun,
    views: Views,
    series_json: bool,
}

impl TerminalSink {
    pub fn new(unit: UnitNoun, views: Views) -> Self {
        Self {
            unit,
            views,
            series_json: false,
        }
    }

    pub fn with_series_json(mut self, json: bool) -> Self {
        self.series_json = json;
        self
    }
}

pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

impl RenderSink for TerminalSink {
    fn render_progress(&mut self, progress: &AggregateResult) {
        if !self.views.progress {
            return;
        }
        println!("{} {}", progress_bar(progress.percent_complete), progress.headline());
        println!("{}", progress.counter_label(&self.unit));
        if progress.undefined {
            println!("(no debt recorded yet)");
        }
        println!();
    }

    fn render_log(&mut self, rows: &[DisplayRow]) {
        if !self.views.log {
            return;
        }
        println!("## Log\n");
        if rows.is_empty() {
            println!("(empty)");
        }
        for row in rows {
            println!("{:<16} {}", row.date_label(), row.text(&self.unit));
        }
        println!();
    }

    fn render_series(&mut self, points: &[SeriesPoint]) {
        if !self.views.series {
            return;
        }
        if self.series_json {
            match serde_json::to_string_pretty(points) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("serializing series failed: {e}"),
            }
            return;
        }
        println!("## Remaining over time\n");
        for p in points {
            println!(
                "{}  remaining={:<6} {:>4}  {}",
                p.timestamp.format("%Y-%m-%d %H:%M"),
                p.remaining,
                debtbar_core::format::signed_amount(p.amount),
                p.description
            );
        }
        println!();
    }

    fn render_status(&mut self, status: &Status) {
        match status {
            Status::Unavailable { reason } => {
                println!("Debt data unavailable right now ({reason}).");
            }
            Status::Fault { message } => println!("Error: {message}"),
            Status::Accepted { message } | Status::AlreadyContributed { message } => {
                println!("{message}")
            }
        }
    }
}

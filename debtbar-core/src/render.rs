//! Render sink: where computed views go. The core never formats for a
//! particular screen; it hands values to whatever implements this.

use crate::aggregate::AggregateResult;
use crate::log::DisplayRow;
use crate::series::SeriesPoint;

/// User-visible status line produced by fetches and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Fetch failed; whatever is shown is the last good view, if any
    Unavailable { reason: String },
    /// Store accepted the change; its message verbatim
    Accepted { message: String },
    /// This identity already changed the ledger
    AlreadyContributed { message: String },
    /// Store-side failure; its message verbatim
    Fault { message: String },
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Unavailable { reason } => reason,
            Status::Accepted { message }
            | Status::AlreadyContributed { message }
            | Status::Fault { message } => message,
        }
    }
}

pub trait RenderSink {
    fn render_progress(&mut self, progress: &AggregateResult);
    fn render_log(&mut self, rows: &[DisplayRow]);
    fn render_series(&mut self, points: &[SeriesPoint]);
    fn render_status(&mut self, status: &Status);
}

/// Sink that keeps the most recent value of each view.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub progress: Option<AggregateResult>,
    pub log: Option<Vec<DisplayRow>>,
    pub series: Option<Vec<SeriesPoint>>,
    pub statuses: Vec<Status>,
    pub renders: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> Option<&Status> {
        self.statuses.last()
    }
}

impl RenderSink for RecordingSink {
    fn render_progress(&mut self, progress: &AggregateResult) {
        self.renders += 1;
        self.progress = Some(*progress);
    }

    fn render_log(&mut self, rows: &[DisplayRow]) {
        self.renders += 1;
        self.log = Some(rows.to_vec());
    }

    fn render_series(&mut self, points: &[SeriesPoint]) {
        self.renders += 1;
        self.series = Some(points.to_vec());
    }

    fn render_status(&mut self, status: &Status) {
        self.statuses.push(status.clone());
    }
}

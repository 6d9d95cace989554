use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one part of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartReport {
    pub part: String,
    pub label: String,
    /// Not selected by the `parts` filter
    pub skipped: bool,
    pub steps: usize,
    pub records: usize,
    pub elapsed_ms: u128,
}

impl PartReport {
    pub fn skipped(part: &str, label: &str) -> Self {
        Self {
            part: part.to_string(),
            label: label.to_string(),
            skipped: true,
            steps: 0,
            records: 0,
            elapsed_ms: 0,
        }
    }
}

/// Outcome of a completed batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub import_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<i64>,
    pub parts: Vec<PartReport>,
}

impl BatchReport {
    pub fn total_records(&self) -> usize {
        self.parts.iter().map(|p| p.records).sum()
    }

    pub fn total_steps(&self) -> usize {
        self.parts.iter().map(|p| p.steps).sum()
    }
}

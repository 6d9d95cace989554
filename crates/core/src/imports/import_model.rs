//! Import run domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ImportError, Result};
use crate::utils::time_utils::now_utc;

/// One logical execution of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRun {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub external_run_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportRun {
    pub fn new(external_run_id: Option<&str>) -> Self {
        let now = now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            ended_at: None,
            external_run_id: external_run_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Sets the end time. A run ends exactly once.
    pub fn end(&mut self) -> Result<()> {
        if self.ended_at.is_some() {
            return Err(ImportError::AlreadyEnded.into());
        }
        let now = now_utc();
        self.ended_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Whole seconds between start and end, `None` while the run is open.
    pub fn elapsed_seconds(&self) -> Option<i64> {
        self.ended_at
            .map(|end| end.timestamp() - self.started_at.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_end_twice_fails() {
        let mut run = ImportRun::new(Some("nightly-1"));
        assert!(run.is_open());
        assert_eq!(run.elapsed_seconds(), None);

        run.end().unwrap();
        assert!(!run.is_open());
        assert!(run.elapsed_seconds().unwrap() >= 0);
        assert!(matches!(
            run.end(),
            Err(Error::Import(ImportError::AlreadyEnded))
        ));
    }
}

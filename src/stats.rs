use crate::entry::DownloadEntry;
use crate::error::GrabError;
use crate::status::DownloadStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dashboard counters derived from the current entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub paused: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a DownloadEntry>) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |mut summary, entry| {
                summary.total += 1;
                match entry.status() {
                    DownloadStatus::Downloading => summary.active += 1,
                    DownloadStatus::Completed => summary.completed += 1,
                    DownloadStatus::Paused => summary.paused += 1,
                    DownloadStatus::Error => summary.failed += 1,
                }
                summary
            })
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} active={} completed={} paused={} failed={}",
            self.total, self.active, self.completed, self.paused, self.failed
        )
    }
}

/// Serializable view of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub summary: DownloadSummary,
    pub entries: Vec<DownloadEntry>,
}

impl DashboardSnapshot {
    pub fn new(entries: Vec<DownloadEntry>) -> Self {
        Self {
            summary: DownloadSummary::from_entries(&entries),
            entries,
        }
    }

    pub fn to_json(&self) -> Result<String, GrabError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

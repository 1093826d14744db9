use crate::GrabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Downloading,
    Completed,
    Paused,
    Error,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadStatus::Completed)
    }

    /// Moves a caller may request explicitly. Completion is only reached through progress.
    pub fn can_transition_to(&self, next: DownloadStatus) -> bool {
        use DownloadStatus::*;
        matches!(
            (self, next),
            (Downloading, Paused)
                | (Downloading, Error)
                | (Paused, Downloading)
                | (Paused, Error)
                | (Error, Downloading)
        )
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Paused => "paused",
            DownloadStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DownloadStatus {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "downloading" => Ok(DownloadStatus::Downloading),
            "completed" => Ok(DownloadStatus::Completed),
            "paused" => Ok(DownloadStatus::Paused),
            "error" => Ok(DownloadStatus::Error),
            other => Err(GrabError::Parse(format!("unknown status '{}'", other))),
        }
    }
}

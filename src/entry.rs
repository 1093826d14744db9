use crate::format::{Quality, VideoFormat};
use crate::request::DownloadEntryRequest;
use crate::status::DownloadStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One tracked download.
///
/// `progress` and `status` are only mutated through the store, which keeps
/// `completed <=> progress == 100` and `downloading => progress < 100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub id: u32,
    pub title: String,
    pub source_url: String,
    pub format: VideoFormat,
    pub quality: Quality,
    pub size_bytes: Option<u64>,
    progress: u8,
    status: DownloadStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DownloadEntry {
    pub(crate) fn from_request(id: u32, request: DownloadEntryRequest) -> Self {
        let source_url = request.url.trim().to_string();
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_url(&source_url));

        let mut progress = request.progress.unwrap_or(0).min(100);
        let mut status = request.status.unwrap_or(DownloadStatus::Downloading);
        if progress == 100 {
            status = DownloadStatus::Completed;
        } else if status == DownloadStatus::Completed {
            progress = 100;
        }

        let now = Utc::now();
        Self {
            id,
            title,
            source_url,
            format: request.format,
            quality: request.quality,
            size_bytes: request.size_bytes,
            progress,
            status,
            last_error: None,
            created_at: request.created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> DownloadStatus {
        self.status
    }

    pub fn is_downloading(&self) -> bool {
        self.status == DownloadStatus::Downloading
    }

    /// Decimal size label such as "2.4 GB".
    pub fn size_label(&self) -> String {
        match self.size_bytes {
            Some(bytes) => bytesize::to_string(bytes, false),
            None => "unknown".to_string(),
        }
    }

    pub(crate) fn set_progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
        if self.progress == 100 {
            self.status = DownloadStatus::Completed;
        }
        self.touch();
    }

    pub(crate) fn set_status(&mut self, status: DownloadStatus) {
        self.status = status;
        if status != DownloadStatus::Error {
            self.last_error = None;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Last non-empty path segment, else the host, else the raw input.
fn title_from_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string())
        .or_else(|| parsed.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| raw.to_string())
}

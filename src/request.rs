use crate::format::{Quality, VideoFormat};
use crate::status::DownloadStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//---------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadEntryRequest {
    pub id: Option<u32>,
    pub url: String,
    pub title: Option<String>,
    pub format: VideoFormat,
    pub quality: Quality,
    pub size_bytes: Option<u64>,
    pub status: Option<DownloadStatus>,
    pub progress: Option<u8>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DownloadEntryRequest {
    /// New builder; the URL is mandatory and validated when the entry is added.
    pub fn builder(url: impl Into<String>) -> DownloadEntryRequestBuilder {
        DownloadEntryRequestBuilder {
            id: None,
            url: url.into(),
            title: None,
            format: VideoFormat::default(),
            quality: Quality::default(),
            size_bytes: None,
            status: None,
            progress: None,
            created_at: None,
        }
    }
}

pub struct DownloadEntryRequestBuilder {
    id: Option<u32>,
    url: String,
    title: Option<String>,
    format: VideoFormat,
    quality: Quality,
    size_bytes: Option<u64>,
    status: Option<DownloadStatus>,
    progress: Option<u8>,
    created_at: Option<DateTime<Utc>>,
}

impl DownloadEntryRequestBuilder {
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn format(mut self, format: VideoFormat) -> Self {
        self.format = format;
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    pub fn status(mut self, status: DownloadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, percent: u8) -> Self {
        self.progress = Some(percent);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> DownloadEntryRequest {
        DownloadEntryRequest {
            id: self.id,
            url: self.url,
            title: self.title,
            format: self.format,
            quality: self.quality,
            size_bytes: self.size_bytes,
            status: self.status,
            progress: self.progress,
            created_at: self.created_at,
        }
    }
}
//---------------------------------------------------------------------------------

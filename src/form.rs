use crate::entry::DownloadEntry;
use crate::error::GrabError;
use crate::format::{Quality, VideoFormat};
use crate::manager::DownloadManager;
use crate::request::DownloadEntryRequest;
use log::debug;
use std::sync::Arc;

/// Download request form: URL, container and resolution, plus the entry it last started.
#[derive(Debug, Clone, Default)]
pub struct DownloadForm {
    pub url: String,
    pub format: VideoFormat,
    pub quality: Quality,
    pub title: Option<String>,
    current: Option<u32>,
}

impl DownloadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    pub fn set_format(&mut self, format: VideoFormat) -> &mut Self {
        self.format = format;
        self
    }

    pub fn set_quality(&mut self, quality: Quality) -> &mut Self {
        self.quality = quality;
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Id of the entry started by the last successful submit.
    pub fn current_entry(&self) -> Option<u32> {
        self.current
    }

    pub fn to_request(&self) -> DownloadEntryRequest {
        let mut builder = DownloadEntryRequest::builder(self.url.trim())
            .format(self.format)
            .quality(self.quality);
        if let Some(title) = &self.title {
            builder = builder.title(title.clone());
        }
        builder.build()
    }

    /// Submits the form. Refused without a notification while the previous download
    /// from this form is still running.
    pub async fn submit(
        &mut self,
        manager: &Arc<DownloadManager>,
    ) -> Result<DownloadEntry, GrabError> {
        if self.is_downloading(manager).await {
            debug!("[Form] Submit ignored, entry {:?} still downloading", self.current);
            return Err(GrabError::Validation(
                "A download is already in progress".into(),
            ));
        }

        let entry = manager.submit(self.to_request()).await?;
        self.current = Some(entry.id);
        Ok(entry)
    }

    pub async fn progress(&self, manager: &DownloadManager) -> Option<u8> {
        let id = self.current?;
        manager.entry(id).await.map(|e| e.progress())
    }

    pub async fn is_downloading(&self, manager: &DownloadManager) -> bool {
        let Some(id) = self.current else {
            return false;
        };
        manager
            .entry(id)
            .await
            .map_or(false, |e| e.is_downloading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrabConfig;
    use crate::events::DownloadEvent;
    use crate::status::DownloadStatus;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn reference_scenario() {
        let manager = DownloadManager::new(GrabConfig::default()).unwrap();
        let mut rx = manager.subscribe_events();

        let mut form = DownloadForm::new();
        form.set_url("https://x/v1")
            .set_format(VideoFormat::Mp4)
            .set_quality(Quality::P1080);

        let entry = form.submit(&manager).await.unwrap();
        assert_eq!(entry.source_url, "https://x/v1");
        assert_eq!(entry.format, VideoFormat::Mp4);
        assert_eq!(entry.quality, Quality::P1080);
        assert_eq!(entry.progress(), 0);

        sleep(Duration::from_millis(2_550)).await;
        assert_eq!(form.progress(&manager).await, Some(50));
        assert!(form.is_downloading(&manager).await);

        sleep(Duration::from_millis(2_500)).await;
        let done = manager.entry(entry.id).await.unwrap();
        assert_eq!(done.progress(), 100);
        assert_eq!(done.status(), DownloadStatus::Completed);
        assert!(!form.is_downloading(&manager).await);

        sleep(Duration::from_millis(5_000)).await;
        assert_eq!(
            manager.entry(entry.id).await.unwrap().status(),
            DownloadStatus::Completed
        );

        let mut success_notifications = 0;
        while let Ok(event) = rx.try_recv() {
            if let DownloadEvent::Notification(n) = event {
                if n.kind == crate::events::NotificationKind::Success {
                    success_notifications += 1;
                }
            }
        }
        assert_eq!(success_notifications, 1);
    }

    #[tokio::test]
    async fn empty_url_adds_nothing() {
        let manager = DownloadManager::new(GrabConfig::default()).unwrap();
        let mut form = DownloadForm::new();

        let err = form.submit(&manager).await.unwrap_err();
        assert_eq!(err, GrabError::url_required());
        assert!(manager.entries().await.is_empty());
        assert_eq!(form.current_entry(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_form_refuses_second_submit() {
        let manager = DownloadManager::new(GrabConfig::default()).unwrap();
        let mut form = DownloadForm::new();
        form.set_url("https://x/v1");
        form.submit(&manager).await.unwrap();

        let mut rx = manager.subscribe_events();
        form.set_url("https://x/v2");
        assert!(matches!(
            form.submit(&manager).await,
            Err(GrabError::Validation(_))
        ));
        assert_eq!(manager.entries().await.len(), 1);
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(5_100)).await;
        let second = form.submit(&manager).await.unwrap();
        assert_eq!(second.source_url, "https://x/v2");
        assert_eq!(manager.entries().await.len(), 2);
    }
}

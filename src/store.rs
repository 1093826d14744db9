use crate::entry::DownloadEntry;
use crate::error::GrabError;
use crate::format::{Quality, VideoFormat};
use crate::request::DownloadEntryRequest;
use crate::stats::DownloadSummary;
use crate::status::DownloadStatus;
use log::debug;
use std::collections::HashSet;

/// Result of a progress write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// Nothing changed: the value did not advance or the entry was already complete.
    Unchanged,
    Advanced(u8),
    /// The entry just reached 100. Returned once per entry.
    Completed,
}

/// Ordered, exclusively owned list of download entries.
#[derive(Debug)]
pub struct DownloadListStore {
    entries: Vec<DownloadEntry>,
    // wider than ids so the slot after u32::MAX is representable
    next_id: u64,
    retired: HashSet<u32>,
}

impl Default for DownloadListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadListStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            retired: HashSet::new(),
        }
    }

    /// Store pre-filled with the dashboard's sample downloads.
    pub fn with_demo_entries() -> Result<Self, GrabError> {
        let mut store = Self::new();
        let samples = [
            (
                "Amazing Sunset Timelapse 4K",
                "https://example.com/video1",
                VideoFormat::Mp4,
                Quality::Uhd4k,
                2_400_000_000,
                100,
                DownloadStatus::Completed,
            ),
            (
                "Tutorial: React Advanced Patterns",
                "https://example.com/video2",
                VideoFormat::Mkv,
                Quality::P1080,
                1_800_000_000,
                67,
                DownloadStatus::Downloading,
            ),
            (
                "Nature Documentary - Wildlife",
                "https://example.com/video3",
                VideoFormat::Avi,
                Quality::P720,
                980_000_000,
                0,
                DownloadStatus::Paused,
            ),
        ];
        for (title, url, format, quality, size, progress, status) in samples {
            store.add(
                DownloadEntryRequest::builder(url)
                    .title(title)
                    .format(format)
                    .quality(quality)
                    .size_bytes(size)
                    .progress(progress)
                    .status(status)
                    .build(),
            )?;
        }
        Ok(store)
    }

    pub fn entries(&self) -> &[DownloadEntry] {
        &self.entries
    }

    pub fn get(&self, id: u32) -> Option<&DownloadEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut DownloadEntry, GrabError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(GrabError::EntryNotFound(id))
    }

    pub fn add(&mut self, request: DownloadEntryRequest) -> Result<DownloadEntry, GrabError> {
        if request.url.trim().is_empty() {
            return Err(GrabError::url_required());
        }

        let id = match request.id {
            Some(id) => id,
            None => u32::try_from(self.next_id)
                .map_err(|_| GrabError::Validation("No entry ids left".into()))?,
        };
        if self.is_taken(id) {
            return Err(GrabError::Validation(format!("Entry id {} already used", id)));
        }
        self.next_id = self.next_id.max(u64::from(id) + 1);

        let entry = DownloadEntry::from_request(id, request);
        debug!(
            "[Store] Added entry {} ({} {} {}%)",
            entry.id,
            entry.format,
            entry.quality,
            entry.progress()
        );
        self.entries.push(entry.clone());
        Ok(entry)
    }

    fn is_taken(&self, id: u32) -> bool {
        self.get(id).is_some() || self.retired.contains(&id)
    }

    /// Unknown ids are ignored, so repeated removal is harmless.
    pub fn remove(&mut self, id: u32) -> Option<DownloadEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        self.retired.insert(id);
        let entry = self.entries.remove(pos);
        debug!("[Store] Removed entry {}", id);
        Some(entry)
    }

    /// Returns `Ok(false)` when the entry already has `status`.
    pub fn set_status(&mut self, id: u32, status: DownloadStatus) -> Result<bool, GrabError> {
        let entry = self.get_mut(id)?;
        let current = entry.status();
        if current == status {
            return Ok(false);
        }
        if !current.can_transition_to(status) {
            return Err(GrabError::InvalidTransition {
                id,
                from: current,
                to: status,
            });
        }
        entry.set_status(status);
        Ok(true)
    }

    pub fn set_progress(&mut self, id: u32, percent: u8) -> Result<ProgressOutcome, GrabError> {
        let entry = self.get_mut(id)?;
        match entry.status() {
            status if status.is_terminal() => return Ok(ProgressOutcome::Unchanged),
            DownloadStatus::Downloading => {}
            other => return Err(GrabError::NotDownloading(id, other)),
        }

        let percent = percent.min(100);
        if percent <= entry.progress() {
            return Ok(ProgressOutcome::Unchanged);
        }

        entry.set_progress(percent);
        if entry.status() == DownloadStatus::Completed {
            Ok(ProgressOutcome::Completed)
        } else {
            Ok(ProgressOutcome::Advanced(percent))
        }
    }

    /// Moves the entry to `error`, keeping the reason for display.
    pub fn fail(&mut self, id: u32, reason: impl Into<String>) -> Result<(), GrabError> {
        self.set_status(id, DownloadStatus::Error)?;
        self.get_mut(id)?.last_error = Some(reason.into());
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn active(&self) -> usize {
        self.count(DownloadStatus::Downloading)
    }

    pub fn completed(&self) -> usize {
        self.count(DownloadStatus::Completed)
    }

    fn count(&self, status: DownloadStatus) -> usize {
        self.entries.iter().filter(|e| e.status() == status).count()
    }

    pub fn summary(&self) -> DownloadSummary {
        DownloadSummary::from_entries(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> DownloadEntryRequest {
        DownloadEntryRequest::builder(url).build()
    }

    #[test]
    fn add_creates_downloading_entry_at_zero() {
        let mut store = DownloadListStore::new();
        let entry = store
            .add(
                DownloadEntryRequest::builder("https://x/v1")
                    .format(VideoFormat::Mp4)
                    .quality(Quality::P1080)
                    .build(),
            )
            .unwrap();
        assert_eq!(entry.status(), DownloadStatus::Downloading);
        assert_eq!(entry.progress(), 0);
        assert_eq!(entry.source_url, "https://x/v1");
        assert_eq!(entry.format, VideoFormat::Mp4);
        assert_eq!(entry.quality, Quality::P1080);
    }

    #[test]
    fn add_rejects_empty_url() {
        let mut store = DownloadListStore::new();
        assert_eq!(store.add(request("")), Err(GrabError::url_required()));
        assert_eq!(store.add(request("   ")), Err(GrabError::url_required()));
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut store = DownloadListStore::new();
        let a = store.add(request("https://x/a")).unwrap();
        let b = store.add(request("https://x/b")).unwrap();
        let c = store.add(request("https://x/c")).unwrap();
        let ids: Vec<u32> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn remove_is_idempotent_and_ids_are_not_reused() {
        let mut store = DownloadListStore::new();
        let a = store.add(request("https://x/a")).unwrap();
        store.add(request("https://x/b")).unwrap();

        assert!(store.remove(a.id).is_some());
        let after_first: Vec<DownloadEntry> = store.entries().to_vec();
        assert!(store.remove(a.id).is_none());
        assert_eq!(store.entries(), after_first.as_slice());
        assert!(store.remove(999).is_none());

        let err = store
            .add(DownloadEntryRequest::builder("https://x/a").id(a.id).build())
            .unwrap_err();
        assert!(matches!(err, GrabError::Validation(_)));

        let c = store.add(request("https://x/c")).unwrap();
        assert_ne!(c.id, a.id);
    }

    #[test]
    fn ids_stay_unique_at_the_top_of_the_range() {
        let mut store = DownloadListStore::new();
        let last = store
            .add(DownloadEntryRequest::builder("https://x/a").id(u32::MAX).build())
            .unwrap();
        assert_eq!(last.id, u32::MAX);

        let err = store.add(request("https://x/b")).unwrap_err();
        assert!(matches!(err, GrabError::Validation(_)));
        assert_eq!(store.total(), 1);

        store.remove(u32::MAX);
        assert!(store.add(request("https://x/c")).is_err());
        let reused = store.add(DownloadEntryRequest::builder("https://x/d").id(u32::MAX).build());
        assert!(matches!(reused, Err(GrabError::Validation(_))));

        let low = store
            .add(DownloadEntryRequest::builder("https://x/e").id(5).build())
            .unwrap();
        assert_eq!(low.id, 5);
    }

    #[test]
    fn progress_is_monotonic_and_completes_once() {
        let mut store = DownloadListStore::new();
        let id = store.add(request("https://x/v1")).unwrap().id;

        assert_eq!(store.set_progress(id, 40), Ok(ProgressOutcome::Advanced(40)));
        assert_eq!(store.set_progress(id, 30), Ok(ProgressOutcome::Unchanged));
        assert_eq!(store.get(id).unwrap().progress(), 40);

        assert_eq!(store.set_progress(id, 140), Ok(ProgressOutcome::Completed));
        let entry = store.get(id).unwrap();
        assert_eq!(entry.progress(), 100);
        assert_eq!(entry.status(), DownloadStatus::Completed);

        assert_eq!(store.set_progress(id, 100), Ok(ProgressOutcome::Unchanged));
        assert_eq!(store.get(id).unwrap().status(), DownloadStatus::Completed);
    }

    #[test]
    fn progress_requires_downloading() {
        let mut store = DownloadListStore::new();
        let id = store.add(request("https://x/v1")).unwrap().id;
        store.set_progress(id, 20).unwrap();
        store.set_status(id, DownloadStatus::Paused).unwrap();

        assert_eq!(
            store.set_progress(id, 30),
            Err(GrabError::NotDownloading(id, DownloadStatus::Paused))
        );
        assert_eq!(store.get(id).unwrap().progress(), 20);
        assert_eq!(
            store.set_progress(77, 30),
            Err(GrabError::EntryNotFound(77))
        );
    }

    #[test]
    fn status_transitions_are_checked() {
        let mut store = DownloadListStore::new();
        let id = store.add(request("https://x/v1")).unwrap().id;

        assert_eq!(store.set_status(id, DownloadStatus::Downloading), Ok(false));
        assert_eq!(store.set_status(id, DownloadStatus::Paused), Ok(true));
        assert_eq!(store.set_status(id, DownloadStatus::Downloading), Ok(true));
        assert_eq!(
            store.set_status(id, DownloadStatus::Completed),
            Err(GrabError::InvalidTransition {
                id,
                from: DownloadStatus::Downloading,
                to: DownloadStatus::Completed,
            })
        );

        store.set_progress(id, 100).unwrap();
        assert!(store.set_status(id, DownloadStatus::Paused).is_err());
        assert_eq!(store.get(id).unwrap().status(), DownloadStatus::Completed);
    }

    #[test]
    fn fail_records_reason() {
        let mut store = DownloadListStore::new();
        let id = store.add(request("https://x/v1")).unwrap().id;
        store.fail(id, "connection reset").unwrap();

        let entry = store.get(id).unwrap();
        assert_eq!(entry.status(), DownloadStatus::Error);
        assert_eq!(entry.last_error.as_deref(), Some("connection reset"));

        store.set_status(id, DownloadStatus::Downloading).unwrap();
        assert!(store.get(id).unwrap().last_error.is_none());
    }

    #[test]
    fn aggregates_follow_status() {
        let store = DownloadListStore::with_demo_entries().unwrap();
        assert_eq!(store.total(), 3);
        assert_eq!(store.active(), 1);
        assert_eq!(store.completed(), 1);

        let summary = store.summary();
        assert_eq!(summary.paused, 1);
        assert_eq!(summary.failed, 0);
    }
}

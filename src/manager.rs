use crate::catalog::{FormatCatalog, FormatOption};
use crate::config::GrabConfig;
use crate::entry::DownloadEntry;
use crate::error::GrabError;
use crate::events::{DownloadEvent, Notification};
use crate::format::{Quality, VideoFormat};
use crate::request::DownloadEntryRequest;
use crate::stats::DownloadSummary;
use crate::status::DownloadStatus;
use crate::store::{DownloadListStore, ProgressOutcome};
use crate::transfer::{SimulatedTransfer, TransferBackend, TransferHandle, TransferUpdate};
use dashmap::DashMap;
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock, broadcast};

/// Owns the download list and the format catalog, and runs one transfer driver per
/// downloading entry.
///
/// Drivers only hold a weak reference back to the manager. Their handles live in
/// `transfers` and abort the task when dropped, so removing an entry, pausing it or
/// dropping the manager stops its ticker.
pub struct DownloadManager {
    pub config: Arc<GrabConfig>,
    store: Mutex<DownloadListStore>,
    catalog: RwLock<FormatCatalog>,
    transfers: DashMap<u32, TransferHandle>,
    backend: Arc<dyn TransferBackend>,
    event_tx: broadcast::Sender<DownloadEvent>,
}

impl DownloadManager {
    pub fn new(config: GrabConfig) -> Result<Arc<Self>, GrabError> {
        let backend = Arc::new(SimulatedTransfer::from_config(&config));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(
        config: GrabConfig,
        backend: Arc<dyn TransferBackend>,
    ) -> Result<Arc<Self>, GrabError> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(config.event_capacity);
        let store = if config.seed_demo_entries {
            DownloadListStore::with_demo_entries()?
        } else {
            DownloadListStore::new()
        };
        let catalog = match &config.enabled_formats {
            Some(formats) => FormatCatalog::with_enabled(formats),
            None => FormatCatalog::default(),
        };

        debug!(
            "[Manager] Created (tick={}ms step={} entries={})",
            config.tick_interval_ms,
            config.progress_step,
            store.total()
        );

        Ok(Arc::new(Self {
            config: Arc::new(config),
            store: Mutex::new(store),
            catalog: RwLock::new(catalog),
            transfers: DashMap::new(),
            backend,
            event_tx,
        }))
    }

    fn emit(&self, event: DownloadEvent) {
        // no subscribers is not an error
        let _ = self.event_tx.send(event);
    }

    fn notify(&self, notification: Notification) {
        self.emit(DownloadEvent::Notification(notification));
    }

    /// Adds a new `downloading` entry at 0% and starts its transfer.
    ///
    /// An empty URL is rejected with [`GrabError::Validation`] and a single error
    /// notification; nothing is added.
    pub async fn submit(
        self: &Arc<Self>,
        mut request: DownloadEntryRequest,
    ) -> Result<DownloadEntry, GrabError> {
        request.status = Some(DownloadStatus::Downloading);
        request.progress = Some(0);

        let entry = {
            let mut store = self.store.lock().await;
            match store.add(request) {
                Ok(entry) => {
                    self.emit(DownloadEvent::Added(entry.id));
                    entry
                }
                Err(e) => {
                    warn!("[Manager] Rejected download request: {}", e);
                    let description = match &e {
                        GrabError::Validation(msg) => msg.clone(),
                        other => other.to_string(),
                    };
                    self.notify(Notification::error("Error", description));
                    return Err(e);
                }
            }
        };

        info!(
            "[Entry {}] Submitted {} ({} {})",
            entry.id, entry.source_url, entry.format, entry.quality
        );
        self.start_transfer(&entry).await;
        Ok(entry)
    }

    pub async fn submit_url(
        self: &Arc<Self>,
        url: impl Into<String>,
        format: VideoFormat,
        quality: Quality,
    ) -> Result<DownloadEntry, GrabError> {
        let request = DownloadEntryRequest::builder(url)
            .format(format)
            .quality(quality)
            .build();
        self.submit(request).await
    }

    async fn start_transfer(self: &Arc<Self>, entry: &DownloadEntry) {
        let id = entry.id;
        let mut updates = match self.backend.open(entry).await {
            Ok(updates) => updates,
            Err(e) => {
                self.handle_failure(id, e).await;
                return;
            }
        };

        let manager: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if !manager.apply_update(id, update).await {
                    break;
                }
            }
            debug!("[Entry {}] Transfer driver finished", id);
        });

        self.transfers.retain(|_, handle| !handle.is_finished());
        // replacing an older handle aborts its driver
        self.transfers.insert(id, TransferHandle::new(id, task));
    }

    /// Applies one backend update. Returns whether the driver should keep going.
    async fn apply_update(&self, id: u32, update: TransferUpdate) -> bool {
        match update {
            TransferUpdate::Progress(percent) => {
                let mut store = self.store.lock().await;
                match store.set_progress(id, percent) {
                    Ok(ProgressOutcome::Advanced(percent)) => {
                        debug!("[Entry {}] Progress {}%", id, percent);
                        self.emit(DownloadEvent::Progress { id, percent });
                        true
                    }
                    Ok(ProgressOutcome::Completed) => {
                        info!("[Entry {}] Download completed", id);
                        self.emit(DownloadEvent::Progress { id, percent: 100 });
                        self.emit(DownloadEvent::Completed(id));
                        self.notify(Notification::success(
                            "Success!",
                            "Video downloaded successfully",
                        ));
                        false
                    }
                    Ok(ProgressOutcome::Unchanged) => true,
                    Err(e) => {
                        debug!("[Entry {}] Stopping transfer: {}", id, e);
                        false
                    }
                }
            }
            TransferUpdate::Failed(err) => {
                self.handle_failure(id, err).await;
                false
            }
        }
    }

    async fn handle_failure(&self, id: u32, err: GrabError) {
        let mut store = self.store.lock().await;
        match store.fail(id, err.to_string()) {
            Ok(()) => {
                error!("[Entry {}] Transfer failed: {}", id, err);
                self.emit(DownloadEvent::Error(id, err.clone()));
                self.notify(Notification::error("Download failed", err.to_string()));
            }
            Err(e) => {
                warn!("[Entry {}] Could not record failure '{}': {}", id, err, e);
            }
        }
    }

    fn has_live_transfer(&self, id: u32) -> bool {
        self.transfers
            .get(&id)
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Freezes progress and stops the entry's driver.
    pub async fn pause(self: &Arc<Self>, id: u32) -> Result<DownloadEntry, GrabError> {
        let entry = {
            let mut store = self.store.lock().await;
            let changed = store.set_status(id, DownloadStatus::Paused)?;
            if changed {
                self.emit(DownloadEvent::Paused(id));
                self.notify(Notification::info("Paused", format!("Download #{} paused", id)));
            }
            // dropped under the store lock so a racing resume sees no live driver
            self.transfers.remove(&id);
            store.get(id).cloned().ok_or(GrabError::EntryNotFound(id))?
        };

        info!("[Entry {}] Paused at {}%", id, entry.progress());
        Ok(entry)
    }

    /// Moves a paused or failed entry back to `downloading` and restarts its driver from
    /// the current progress.
    pub async fn resume(self: &Arc<Self>, id: u32) -> Result<DownloadEntry, GrabError> {
        let (entry, changed) = {
            let mut store = self.store.lock().await;
            let changed = store.set_status(id, DownloadStatus::Downloading)?;
            if changed {
                self.emit(DownloadEvent::Resumed(id));
                self.notify(Notification::info("Resumed", format!("Download #{} resumed", id)));
            }
            let entry = store.get(id).cloned().ok_or(GrabError::EntryNotFound(id))?;
            (entry, changed)
        };

        // a driver left over from before the pause is about to stop; replace it
        if changed || !self.has_live_transfer(id) {
            info!("[Entry {}] Resuming from {}%", id, entry.progress());
            self.start_transfer(&entry).await;
        }
        Ok(entry)
    }

    /// Deletes the entry and cancels its driver. Unknown ids are ignored.
    pub async fn remove(self: &Arc<Self>, id: u32) -> Option<DownloadEntry> {
        let mut store = self.store.lock().await;
        self.transfers.remove(&id);
        let removed = store.remove(id);
        if removed.is_some() {
            info!("[Entry {}] Removed", id);
            self.emit(DownloadEvent::Removed(id));
        }
        removed
    }

    pub async fn entries(&self) -> Vec<DownloadEntry> {
        self.store.lock().await.entries().to_vec()
    }

    pub async fn entry(&self, id: u32) -> Option<DownloadEntry> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn summary(&self) -> DownloadSummary {
        self.store.lock().await.summary()
    }

    pub async fn formats(&self) -> Vec<FormatOption> {
        self.catalog.read().await.options().to_vec()
    }

    pub async fn toggle_format(&self, id: u32) -> Option<bool> {
        let toggled = self.catalog.write().await.toggle(id);
        match toggled {
            Some(enabled) => info!("[Manager] Format {} enabled={}", id, enabled),
            None => debug!("[Manager] Toggle ignored for unknown format {}", id),
        }
        toggled
    }

    pub fn active_transfers(&self) -> usize {
        self.transfers
            .iter()
            .filter(|handle| !handle.value().is_finished())
            .count()
    }

    /// Cancels every running driver. Entries keep their current state.
    pub fn shutdown(&self) {
        let running = self.active_transfers();
        self.transfers.clear();
        info!("[Manager] Shut down, cancelled {} transfer(s)", running);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DownloadEvent> {
        self.event_tx.subscribe()
    }
}

use crate::config::GrabConfig;
use crate::entry::DownloadEntry;
use crate::error::GrabError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferUpdate {
    Progress(u8),
    Failed(GrabError),
}

/// Source of progress for one entry. A real downloader plugs in here.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    async fn open(
        &self,
        entry: &DownloadEntry,
    ) -> Result<BoxStream<'static, TransferUpdate>, GrabError>;
}

/// Fake transfer: adds `step` percent every `interval` until 100.
#[derive(Debug, Clone)]
pub struct SimulatedTransfer {
    interval: Duration,
    step: u8,
}

impl SimulatedTransfer {
    pub fn new(interval: Duration, step: u8) -> Self {
        Self {
            interval,
            step: step.max(1),
        }
    }

    pub fn from_config(config: &GrabConfig) -> Self {
        Self::new(config.tick_interval(), config.progress_step)
    }

    pub fn next_percent(&self, current: u8) -> u8 {
        current.saturating_add(self.step).min(100)
    }
}

#[async_trait]
impl TransferBackend for SimulatedTransfer {
    async fn open(
        &self,
        entry: &DownloadEntry,
    ) -> Result<BoxStream<'static, TransferUpdate>, GrabError> {
        // first tick lands one full interval after start
        let ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        let this = self.clone();

        Ok(stream::unfold(
            (ticker, entry.progress()),
            move |(mut ticker, current)| {
                let this = this.clone();
                async move {
                    if current >= 100 {
                        return None;
                    }
                    ticker.tick().await;
                    let next = this.next_percent(current);
                    Some((TransferUpdate::Progress(next), (ticker, next)))
                }
            },
        )
        .boxed())
    }
}

/// Owns a spawned driver task; dropping the handle aborts the task.
#[derive(Debug)]
pub struct TransferHandle {
    entry_id: u32,
    task: JoinHandle<()>,
}

impl TransferHandle {
    pub fn new(entry_id: u32, task: JoinHandle<()>) -> Self {
        Self { entry_id, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TransferHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            log::debug!("[Entry {}] Aborting transfer driver", self.entry_id);
            self.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DownloadEntryRequest;

    fn schedule(sim: &SimulatedTransfer, from: u8) -> Vec<u8> {
        let mut out = Vec::new();
        let mut current = from.min(100);
        while current < 100 {
            current = sim.next_percent(current);
            out.push(current);
        }
        out
    }

    fn entry() -> DownloadEntry {
        DownloadEntry::from_request(1, DownloadEntryRequest::builder("https://x/v1").build())
    }

    #[test]
    fn schedule_is_monotonic_and_ends_at_100_once() {
        let sim = SimulatedTransfer::new(Duration::from_millis(500), 30);
        assert_eq!(schedule(&sim, 0), vec![30, 60, 90, 100]);
        assert_eq!(schedule(&sim, 95), vec![100]);
        assert!(schedule(&sim, 100).is_empty());
    }

    #[test]
    fn reference_step_takes_ten_ticks() {
        let sim = SimulatedTransfer::from_config(&GrabConfig::default());
        let ticks = schedule(&sim, 0);
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[4], 50);
        assert_eq!(ticks.iter().filter(|p| **p == 100).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_ticks_on_interval() {
        let sim = SimulatedTransfer::new(Duration::from_millis(500), 50);
        let start = Instant::now();
        let updates: Vec<TransferUpdate> = sim.open(&entry()).await.unwrap().collect().await;

        assert_eq!(
            updates,
            vec![TransferUpdate::Progress(50), TransferUpdate::Progress(100)]
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_aborts_task() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(());
        });
        let handle = TransferHandle::new(7, task);
        assert!(!handle.is_finished());

        drop(handle);
        assert!(rx.await.is_err());
    }
}

use crate::entry::DownloadEntry;
use crate::events::{DownloadEvent, NotificationKind};
use crate::manager::DownloadManager;
use dashmap::DashMap;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}% {msg}";

/// Terminal dashboard: one progress bar per tracked entry.
pub struct ProgressBoard {
    multi: MultiProgress,
    bars: DashMap<u32, (ProgressBar, Instant)>,
    style: ProgressStyle,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Board that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: DashMap::new(),
            style,
        }
    }

    pub fn track(&self, entry: &DownloadEntry) {
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(self.style.clone());
        bar.set_position(entry.progress() as u64);
        bar.set_message(format!(
            "#{} {} | {} {} | {}",
            entry.id,
            entry.title,
            entry.format,
            entry.quality,
            entry.size_label()
        ));
        if entry.is_downloading() {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        self.bars.insert(entry.id, (bar, Instant::now()));
    }

    pub fn position(&self, id: u32) -> Option<u64> {
        self.bars.get(&id).map(|bar| bar.0.position())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    fn elapsed(&self, id: u32) -> String {
        self.bars
            .get(&id)
            .map(|bar| {
                let secs = Duration::from_secs(bar.1.elapsed().as_secs());
                humantime::format_duration(secs).to_string()
            })
            .unwrap_or_default()
    }

    /// Mirrors one manager event onto the board.
    pub async fn apply(&self, event: &DownloadEvent, manager: &DownloadManager) {
        match event {
            DownloadEvent::Added(id) => {
                if let Some(entry) = manager.entry(*id).await {
                    self.track(&entry);
                }
            }
            DownloadEvent::Progress { id, percent } => {
                if let Some(bar) = self.bars.get(id) {
                    bar.0.set_position(*percent as u64);
                }
            }
            DownloadEvent::Completed(id) => {
                let elapsed = self.elapsed(*id);
                if let Some(bar) = self.bars.get(id) {
                    bar.0.finish_with_message(format!("#{} completed in {}", id, elapsed));
                }
            }
            DownloadEvent::Paused(id) => {
                if let Some(bar) = self.bars.get(id) {
                    bar.0.disable_steady_tick();
                    bar.0.set_message(format!("#{} paused", id));
                }
            }
            DownloadEvent::Resumed(id) => {
                if let Some(bar) = self.bars.get(id) {
                    bar.0.enable_steady_tick(Duration::from_millis(100));
                    bar.0.set_message(format!("#{} downloading", id));
                }
            }
            DownloadEvent::Error(id, err) => {
                if let Some(bar) = self.bars.get(id) {
                    bar.0.abandon_with_message(format!("#{} failed: {}", id, err));
                }
            }
            DownloadEvent::Removed(id) => {
                if let Some((_, (bar, _))) = self.bars.remove(id) {
                    bar.finish_and_clear();
                    self.multi.remove(&bar);
                }
            }
            DownloadEvent::Notification(n) => {
                let marker = match n.kind {
                    NotificationKind::Info => "i",
                    NotificationKind::Success => "+",
                    NotificationKind::Error => "!",
                };
                let _ = self
                    .multi
                    .println(format!("[{}] {}: {}", marker, n.title, n.description));
            }
        }
    }
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

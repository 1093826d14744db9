pub mod catalog;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod events;
pub mod form;
pub mod format;
pub mod manager;
pub mod progress;
pub mod request;
pub mod stats;
pub mod status;
pub mod store;
pub mod transfer;

pub use catalog::{FormatCatalog, FormatOption};
pub use config::GrabConfig;
pub use entry::DownloadEntry;
pub use error::GrabError;
pub use form::DownloadForm;
pub use format::{Quality, VideoFormat};
pub use stats::DownloadSummary;
pub use status::DownloadStatus;
pub use store::DownloadListStore;

pub use events::{DownloadEvent, Notification, NotificationKind};
pub use manager::DownloadManager;
pub use request::DownloadEntryRequest;
pub use transfer::{SimulatedTransfer, TransferBackend, TransferUpdate};

pub mod backend;
pub mod format;
pub mod link;
pub mod notifications;
pub mod orchestrator;
pub mod progress;

pub use link::{ShareLink, parse_share_link};
pub use orchestrator::{DownloadError, DownloadResult, Downloader};
pub use progress::{ProgressReporter, TransferProgress};

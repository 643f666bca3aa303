//! Download orchestration.
//!
//! One [`Downloader`] call drives the whole retrieval: classify the link,
//! open an anonymous session, resolve metadata, transfer the file or every
//! folder member, and surface every failure as a status message rather than
//! an error to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::context::AppContext;
use crate::core::backend::{
    DEFAULT_FILE_NAME, RemoteFile, StorageBackend, StorageSession,
};
use crate::core::link::{ShareLink, parse_share_link};
use crate::core::notifications::NotifyEvent;
use crate::core::progress::ProgressReporter;
use crate::display::StatusDisplay;

/// Name used when the backend resolves a folder without one.
pub const DEFAULT_FOLDER_NAME: &str = "MEGA_Folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    /// Path of the downloaded file.
    File(PathBuf),
    /// Destination directory and how many members made it.
    Folder { path: PathBuf, downloaded: usize },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid MEGA link.")]
    InvalidLink,
    #[error("Login failed: {0}")]
    Auth(String),
    #[error("Failed to fetch metadata: {0}")]
    Metadata(String),
    #[error("Download failed: {0}")]
    Transfer(String),
    #[error("Folder is empty or no files were downloaded.")]
    EmptyFolder,
}

pub struct Downloader {
    ctx: AppContext,
    backend: Arc<dyn StorageBackend>,
}

impl Downloader {
    pub fn new(ctx: AppContext, backend: Arc<dyn StorageBackend>) -> Self {
        Self { ctx, backend }
    }

    /// Download whatever `url` points at.
    ///
    /// The single fallible boundary: any internal failure is converted into a
    /// user-visible status message plus `None`. Errors never reach the
    /// caller.
    pub async fn download(
        &self,
        url: &str,
        display: &Arc<dyn StatusDisplay>,
    ) -> Option<DownloadResult> {
        let job_id = Uuid::now_v7();
        let span = info_span!("download", %job_id);

        match self.run(url, display).instrument(span).await {
            Ok(result) => Some(result),
            Err(err) => {
                error!(%job_id, error = %err, "download failed");
                edit_best_effort(display, &err.to_string()).await;
                self.notify_failure(job_id, &err);
                None
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        display: &Arc<dyn StatusDisplay>,
    ) -> Result<DownloadResult, DownloadError> {
        let link = parse_share_link(url).ok_or(DownloadError::InvalidLink)?;

        let session = self
            .backend
            .login()
            .await
            .map_err(|e| DownloadError::Auth(e.to_string()))?;

        match link {
            ShareLink::File { id, key } => {
                self.fetch_file(session.as_ref(), &id, &key, display).await
            }
            ShareLink::Folder { id, key } => {
                self.fetch_folder(session.as_ref(), &id, &key, display).await
            }
        }
    }

    async fn fetch_file(
        &self,
        session: &dyn StorageSession,
        id: &str,
        key: &str,
        display: &Arc<dyn StatusDisplay>,
    ) -> Result<DownloadResult, DownloadError> {
        let file = session
            .file_metadata(id, key)
            .await
            .map_err(|e| DownloadError::Metadata(e.to_string()))?;

        let name = file
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        edit_best_effort(display, &format!("Downloading file: {name}")).await;

        let dest = self.ctx.config.download_directory.clone();
        let path = self
            .transfer(session, &file, &dest, &name, display)
            .await
            .map_err(|e| DownloadError::Transfer(e.to_string()))?;

        info!(file = %path.display(), "file downloaded");
        Ok(DownloadResult::File(path))
    }

    async fn fetch_folder(
        &self,
        session: &dyn StorageSession,
        id: &str,
        key: &str,
        display: &Arc<dyn StatusDisplay>,
    ) -> Result<DownloadResult, DownloadError> {
        edit_best_effort(display, "Fetching folder contents...").await;

        let folder = session
            .folder_metadata(id, key)
            .await
            .map_err(|e| DownloadError::Metadata(e.to_string()))?;

        let folder_name = folder
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());
        let dest = self.ctx.config.download_directory.join(&folder_name);

        // Idempotent: re-running the same share link merges into the same
        // directory.
        tokio::fs::create_dir_all(&dest)
            .await
            .map_err(|e| DownloadError::Transfer(e.to_string()))?;

        edit_best_effort(
            display,
            &format!(
                "Folder: {folder_name}\nDownloading {} file(s)...",
                folder.files.len()
            ),
        )
        .await;

        let mut downloaded = 0usize;
        for file in &folder.files {
            let name = file
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            match self.transfer(session, file, &dest, &name, display).await {
                Ok(path) => {
                    downloaded += 1;
                    debug!(file = %path.display(), "folder member downloaded");
                }
                // A single member never aborts the folder run.
                Err(err) => warn!(file = %name, error = %err, "folder member failed"),
            }
        }

        if downloaded == 0 {
            return Err(DownloadError::EmptyFolder);
        }

        info!(folder = %dest.display(), downloaded, "folder downloaded");
        Ok(DownloadResult::Folder {
            path: dest,
            downloaded,
        })
    }

    /// One transfer with progress streamed to the display.
    async fn transfer(
        &self,
        session: &dyn StorageSession,
        file: &RemoteFile,
        dest_dir: &Path,
        label: &str,
        display: &Arc<dyn StatusDisplay>,
    ) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;

        let (tx, rx) = mpsc::channel(32);
        let reporter =
            ProgressReporter::new(format!("Downloading file: {label}"), Arc::clone(display));
        let drain = tokio::spawn(reporter.drain(rx));

        let result = session.download(file, dest_dir, tx).await;
        let _ = drain.await;

        Ok(result?)
    }

    fn notify_failure(&self, job_id: Uuid, err: &DownloadError) {
        let Some(notifier) = &self.ctx.notifier else {
            return;
        };

        // Fire and forget: notification delivery never blocks or fails a
        // download request.
        let notifier = Arc::clone(notifier);
        let event = NotifyEvent::DownloadFailed {
            job_id: job_id.to_string(),
            error: err.to_string(),
        };
        tokio::spawn(async move {
            if let Err(error) = notifier.notify(event).await {
                warn!(%error, "error notification was not delivered");
            }
        });
    }
}

async fn edit_best_effort(display: &Arc<dyn StatusDisplay>, text: &str) {
    if let Err(error) = display.edit(text).await {
        debug!(%error, "status update dropped");
    }
}

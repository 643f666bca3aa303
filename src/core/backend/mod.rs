//! Storage backend contract.
//!
//! The orchestrator drives whatever MEGA client is integrated through these
//! traits. A session is acquired per request via [`StorageBackend::login`]
//! and dropped when the request completes; sessions are not shared across
//! concurrent requests.

pub mod simulated;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::progress::TransferProgress;

/// Name used when the backend resolves a file without one.
pub const DEFAULT_FILE_NAME: &str = "file.bin";

/// A backend-resolved file handle.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Opaque per-session handle the backend uses to locate the bytes.
    pub handle: String,
    pub name: Option<String>,
    pub size: u64,
}

/// A backend-resolved folder listing.
#[derive(Debug, Clone)]
pub struct RemoteFolder {
    pub name: Option<String>,
    pub files: Vec<RemoteFile>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("login rejected: {0}")]
    Login(String),
    #[error("no node matches id {0}")]
    NotFound(String),
    #[error("decryption key rejected for id {0}")]
    BadKey(String),
    #[error("transfer failed: {0}")]
    Transfer(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Establish an anonymous session. Share links grant public access, so
    /// no credentials are required or accepted.
    async fn login(&self) -> Result<Box<dyn StorageSession>, BackendError>;
}

#[async_trait]
pub trait StorageSession: Send + Sync {
    async fn file_metadata(&self, id: &str, key: &str) -> Result<RemoteFile, BackendError>;

    async fn folder_metadata(&self, id: &str, key: &str) -> Result<RemoteFolder, BackendError>;

    /// Download `file` into `dest_dir`, emitting byte-count samples on
    /// `progress` at a cadence owned by the implementation. Returns the path
    /// of the written file.
    async fn download(
        &self,
        file: &RemoteFile,
        dest_dir: &Path,
        progress: mpsc::Sender<TransferProgress>,
    ) -> Result<PathBuf, BackendError>;
}

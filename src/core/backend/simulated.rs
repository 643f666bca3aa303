//! Simulated storage backend.
//!
//! Serves two purposes: integration tests script it with known entries and
//! drive the orchestrator against it, and the CLI `--simulation` flag runs a
//! paced demo transfer without touching the network. Transfers write real
//! bytes to the destination and stream progress samples like a live client
//! would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::sleep;

use super::{
    BackendError, DEFAULT_FILE_NAME, RemoteFile, RemoteFolder, StorageBackend, StorageSession,
};
use crate::core::progress::TransferProgress;

const CHUNK_SIZE: usize = 64 * 1024;

const DEMO_FILE_SIZE: usize = 8 * 1024 * 1024;
const DEMO_PACE: Duration = Duration::from_millis(100);
const DEMO_FOLDER_MEMBERS: usize = 3;

/// One scripted remote file.
#[derive(Debug, Clone)]
pub struct SimEntry {
    pub name: Option<String>,
    pub content: Vec<u8>,
    fail: bool,
}

impl SimEntry {
    pub fn new(name: Option<&str>, content: &[u8]) -> Self {
        Self {
            name: name.map(str::to_string),
            content: content.to_vec(),
            fail: false,
        }
    }

    /// An entry whose transfer always fails.
    pub fn failing(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            content: Vec::new(),
            fail: true,
        }
    }
}

#[derive(Debug, Clone)]
struct SimFolder {
    name: Option<String>,
    members: Vec<SimEntry>,
}

#[derive(Clone, Default)]
pub struct SimulatedBackend {
    files: HashMap<String, (String, SimEntry)>,
    folders: HashMap<String, (String, SimFolder)>,
    login_error: Option<String>,
    demo: bool,
    pace: Option<Duration>,
    login_calls: Arc<AtomicUsize>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fabricates content for any id, pacing chunks so the
    /// throttled progress rendering is observable from the CLI.
    pub fn demo() -> Self {
        Self {
            demo: true,
            pace: Some(DEMO_PACE),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, id: &str, key: &str, entry: SimEntry) -> Self {
        self.files.insert(id.to_string(), (key.to_string(), entry));
        self
    }

    pub fn with_folder(
        mut self,
        id: &str,
        key: &str,
        name: Option<&str>,
        members: Vec<SimEntry>,
    ) -> Self {
        let folder = SimFolder {
            name: name.map(str::to_string),
            members,
        };
        self.folders.insert(id.to_string(), (key.to_string(), folder));
        self
    }

    /// Make every login attempt fail with `message`.
    pub fn with_login_error(mut self, message: &str) -> Self {
        self.login_error = Some(message.to_string());
        self
    }

    /// How many times `login` has been called on this backend.
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StorageBackend for SimulatedBackend {
    async fn login(&self) -> Result<Box<dyn StorageSession>, BackendError> {
        self.login_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.login_error {
            return Err(BackendError::Login(message.clone()));
        }
        Ok(Box::new(SimulatedSession {
            backend: self.clone(),
        }))
    }
}

struct SimulatedSession {
    backend: SimulatedBackend,
}

impl SimulatedSession {
    fn resolve(&self, handle: &str) -> Result<SimEntry, BackendError> {
        if self.backend.demo {
            return Ok(demo_entry(handle));
        }

        if let Some((_, entry)) = self.backend.files.get(handle) {
            return Ok(entry.clone());
        }

        // Folder members are addressed as <folder id>/<index>.
        if let Some((folder_id, index)) = handle.split_once('/') {
            if let Some((_, folder)) = self.backend.folders.get(folder_id) {
                if let Some(entry) = index.parse::<usize>().ok().and_then(|i| folder.members.get(i))
                {
                    return Ok(entry.clone());
                }
            }
        }

        Err(BackendError::NotFound(handle.to_string()))
    }
}

#[async_trait]
impl StorageSession for SimulatedSession {
    async fn file_metadata(&self, id: &str, key: &str) -> Result<RemoteFile, BackendError> {
        if self.backend.demo {
            let entry = demo_entry(id);
            return Ok(remote_file(id.to_string(), &entry));
        }

        let (expected_key, entry) = self
            .backend
            .files
            .get(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        if key != expected_key {
            return Err(BackendError::BadKey(id.to_string()));
        }
        Ok(remote_file(id.to_string(), entry))
    }

    async fn folder_metadata(&self, id: &str, key: &str) -> Result<RemoteFolder, BackendError> {
        if self.backend.demo {
            let files = (0..DEMO_FOLDER_MEMBERS)
                .map(|i| {
                    let mut entry = demo_entry(id);
                    entry.name = Some(format!("part-{:02}.bin", i + 1));
                    remote_file(format!("{id}/{i}"), &entry)
                })
                .collect();
            return Ok(RemoteFolder {
                name: Some("simulated_folder".to_string()),
                files,
            });
        }

        let (expected_key, folder) = self
            .backend
            .folders
            .get(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        if key != expected_key {
            return Err(BackendError::BadKey(id.to_string()));
        }
        let files = folder
            .members
            .iter()
            .enumerate()
            .map(|(i, entry)| remote_file(format!("{id}/{i}"), entry))
            .collect();
        Ok(RemoteFolder {
            name: folder.name.clone(),
            files,
        })
    }

    async fn download(
        &self,
        file: &RemoteFile,
        dest_dir: &Path,
        progress: mpsc::Sender<TransferProgress>,
    ) -> Result<PathBuf, BackendError> {
        let entry = self.resolve(&file.handle)?;
        if entry.fail {
            return Err(BackendError::Transfer(format!(
                "simulated transfer failure for {}",
                file.handle
            )));
        }

        let name = file.name.as_deref().unwrap_or(DEFAULT_FILE_NAME);
        let path = dest_dir.join(name);
        let total = entry.content.len() as u64;

        let mut out = tokio::fs::File::create(&path).await?;
        let mut written = 0u64;
        let _ = progress
            .send(TransferProgress {
                transferred: 0,
                total,
            })
            .await;

        for chunk in entry.content.chunks(CHUNK_SIZE) {
            out.write_all(chunk).await?;
            written += chunk.len() as u64;
            let _ = progress
                .send(TransferProgress {
                    transferred: written,
                    total,
                })
                .await;
            if let Some(pace) = self.backend.pace {
                sleep(pace).await;
            }
        }

        out.flush().await?;
        Ok(path)
    }
}

fn remote_file(handle: String, entry: &SimEntry) -> RemoteFile {
    RemoteFile {
        handle,
        name: entry.name.clone(),
        size: entry.content.len() as u64,
    }
}

fn demo_entry(_handle: &str) -> SimEntry {
    SimEntry {
        name: Some("simulated.bin".to_string()),
        content: vec![0u8; DEMO_FILE_SIZE],
        fail: false,
    }
}

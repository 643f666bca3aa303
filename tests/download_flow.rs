use async_trait::async_trait;
use megadl::config::AppConfig;
use megadl::context::AppContext;
use megadl::core::backend::simulated::{SimEntry, SimulatedBackend};
use megadl::core::{DownloadResult, Downloader};
use megadl::display::StatusDisplay;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Captures every status edit so tests can assert on what the user saw.
#[derive(Default)]
struct RecordingDisplay {
    edits: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }

    fn last_edit(&self) -> String {
        self.edits().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StatusDisplay for RecordingDisplay {
    async fn edit(&self, text: &str) -> anyhow::Result<()> {
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn downloader(dir: &Path, backend: &SimulatedBackend) -> Downloader {
    let config = AppConfig {
        download_directory: dir.to_path_buf(),
        ..AppConfig::default()
    };
    Downloader::new(
        AppContext::new(config, None),
        Arc::new(backend.clone()),
    )
}

#[tokio::test]
async fn file_link_downloads_and_updates_display() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_file(
        "abc123",
        "key456",
        SimEntry::new(Some("a.bin"), b"hello world"),
    );
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/file/abc123#key456", &display)
        .await;

    match result {
        Some(DownloadResult::File(path)) => {
            assert_eq!(path, dir.path().join("a.bin"));
            assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
        }
        other => panic!("expected file result, got {other:?}"),
    }

    // At least the starting message and the terminal progress render.
    let edits = recorder.edits();
    assert!(edits.len() >= 2, "got {edits:?}");
    assert!(edits[0].contains("Downloading file: a.bin"), "got {edits:?}");
    assert!(
        edits.last().unwrap().contains("100.00%"),
        "got {edits:?}"
    );
}

#[tokio::test]
async fn unnamed_file_falls_back_to_placeholder() {
    let dir = tempdir().unwrap();
    let backend =
        SimulatedBackend::new().with_file("abc", "key", SimEntry::new(None, b"anonymous"));
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/file/abc#key", &display)
        .await;

    match result {
        Some(DownloadResult::File(path)) => assert_eq!(path, dir.path().join("file.bin")),
        other => panic!("expected file result, got {other:?}"),
    }
}

#[tokio::test]
async fn legacy_link_downloads_as_file() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_file(
        "oldId",
        "oldKey",
        SimEntry::new(Some("legacy.txt"), b"still works"),
    );
    let downloader = downloader(dir.path(), &backend);
    let display: Arc<dyn StatusDisplay> = Arc::new(RecordingDisplay::default());

    let result = downloader
        .download("https://mega.nz/#!oldId!oldKey", &display)
        .await;

    assert!(matches!(result, Some(DownloadResult::File(_))));
}

#[tokio::test]
async fn folder_continues_past_single_member_failure() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_folder(
        "fld1",
        "fkey",
        Some("album"),
        vec![
            SimEntry::new(Some("one.txt"), b"first"),
            SimEntry::failing(Some("two.txt")),
            SimEntry::new(Some("three.txt"), b"third"),
        ],
    );
    let downloader = downloader(dir.path(), &backend);
    let display: Arc<dyn StatusDisplay> = Arc::new(RecordingDisplay::default());

    let result = downloader
        .download("https://mega.nz/folder/fld1#fkey", &display)
        .await;

    let expected_dir = dir.path().join("album");
    match result {
        Some(DownloadResult::Folder { path, downloaded }) => {
            assert_eq!(path, expected_dir);
            assert_eq!(downloaded, 2);
        }
        other => panic!("expected folder result, got {other:?}"),
    }

    assert!(expected_dir.join("one.txt").exists());
    assert!(expected_dir.join("three.txt").exists());
    assert!(!expected_dir.join("two.txt").exists());
}

#[tokio::test]
async fn folder_with_no_successful_members_fails() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_folder(
        "fld1",
        "fkey",
        Some("album"),
        vec![
            SimEntry::failing(Some("one.txt")),
            SimEntry::failing(Some("two.txt")),
        ],
    );
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/folder/fld1#fkey", &display)
        .await;

    assert!(result.is_none());
    assert!(
        recorder.last_edit().contains("empty or no files"),
        "got {:?}",
        recorder.edits()
    );
}

#[tokio::test]
async fn invalid_link_fails_without_touching_the_backend() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new();
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader.download("not-a-link", &display).await;

    assert!(result.is_none());
    assert!(
        recorder.last_edit().contains("Invalid MEGA link"),
        "got {:?}",
        recorder.edits()
    );
    assert_eq!(backend.login_calls(), 0);
}

#[tokio::test]
async fn login_failure_is_reported_verbatim() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_login_error("quota exceeded");
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/file/abc#key", &display)
        .await;

    assert!(result.is_none());
    let last = recorder.last_edit();
    assert!(last.contains("Login failed"), "got {last}");
    assert!(last.contains("quota exceeded"), "got {last}");
}

#[tokio::test]
async fn wrong_key_surfaces_as_metadata_failure() {
    let dir = tempdir().unwrap();
    let backend =
        SimulatedBackend::new().with_file("abc", "right", SimEntry::new(Some("a.bin"), b"data"));
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/file/abc#wrong", &display)
        .await;

    assert!(result.is_none());
    assert!(
        recorder.last_edit().contains("Failed to fetch metadata"),
        "got {:?}",
        recorder.edits()
    );
}

#[tokio::test]
async fn single_file_transfer_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let backend =
        SimulatedBackend::new().with_file("abc", "key", SimEntry::failing(Some("a.bin")));
    let downloader = downloader(dir.path(), &backend);
    let recorder = Arc::new(RecordingDisplay::default());
    let display: Arc<dyn StatusDisplay> = recorder.clone();

    let result = downloader
        .download("https://mega.nz/file/abc#key", &display)
        .await;

    assert!(result.is_none());
    assert!(
        recorder.last_edit().contains("Download failed"),
        "got {:?}",
        recorder.edits()
    );
}

#[tokio::test]
async fn rerunning_a_folder_link_merges_into_the_same_directory() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_folder(
        "fld1",
        "fkey",
        Some("album"),
        vec![SimEntry::new(Some("one.txt"), b"first")],
    );
    let downloader = downloader(dir.path(), &backend);
    let display: Arc<dyn StatusDisplay> = Arc::new(RecordingDisplay::default());

    let url = "https://mega.nz/folder/fld1#fkey";
    let first = downloader.download(url, &display).await;
    let second = downloader.download(url, &display).await;

    let expected = DownloadResult::Folder {
        path: dir.path().join("album"),
        downloaded: 1,
    };
    assert_eq!(first, Some(expected.clone()));
    assert_eq!(second, Some(expected));
}

#[tokio::test]
async fn unnamed_folder_falls_back_to_placeholder() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new().with_folder(
        "fld1",
        "fkey",
        None,
        vec![SimEntry::new(Some("one.txt"), b"first")],
    );
    let downloader = downloader(dir.path(), &backend);
    let display: Arc<dyn StatusDisplay> = Arc::new(RecordingDisplay::default());

    let result = downloader
        .download("https://mega.nz/folder/fld1#fkey", &display)
        .await;

    match result {
        Some(DownloadResult::Folder { path, .. }) => {
            assert_eq!(path, dir.path().join("MEGA_Folder"));
        }
        other => panic!("expected folder result, got {other:?}"),
    }
}

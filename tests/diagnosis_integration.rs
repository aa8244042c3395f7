//! Diagnosis upload integration tests.

mod common;

use std::path::PathBuf;

use common::{Hits, MockBackend, MockState};
use dermx_client::diagnosis::REJECTION_NOTICE;
use dermx_client::{DermxError, UploadState};
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_analyze_uploads_image_part() {
    let backend = MockBackend::spawn().await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "rash.png", PNG);

    let mut upload = UploadState::new();
    assert!(upload.select_path(&path).unwrap());
    assert!(upload.preview().unwrap().starts_with("data:image/png;base64,"));

    let result = upload
        .analyze(&backend.client(), Some("cred-token-ada"))
        .await
        .unwrap();
    assert_eq!(result.condition, "Eczema");
    assert_eq!(result.confidence, 87.5);
    assert_eq!(result.top3.len(), 3);
    assert_eq!(result.top3[1].class, "Psoriasis");
    assert_eq!(result.recommendations.len(), 2);
    assert_eq!(upload.result(), Some(&result));
    assert!(upload.error().is_none());

    let record = backend.state.last_upload.lock().unwrap().clone().unwrap();
    assert_eq!(record.field, "image");
    assert_eq!(record.file_name.as_deref(), Some("rash.png"));
    assert_eq!(record.content_type.as_deref(), Some("image/png"));
    assert_eq!(record.len, PNG.len());
    assert_eq!(record.bearer.as_deref(), Some("cred-token-ada"));
}

#[tokio::test]
async fn test_analyze_without_token() {
    let backend = MockBackend::spawn().await;

    let mut upload = UploadState::new();
    assert!(upload.select_bytes("mole.png", PNG.to_vec()));
    upload.analyze(&backend.client(), None).await.unwrap();

    let record = backend.state.last_upload.lock().unwrap().clone().unwrap();
    assert!(record.bearer.is_none());
}

#[tokio::test]
async fn test_analyze_failure_keeps_backend_text() {
    let backend = MockBackend::spawn().await;
    MockState::fail(&backend.state.fail_analyze);

    let mut upload = UploadState::new();
    upload.select_bytes("rash.png", PNG.to_vec());
    let err = upload.analyze(&backend.client(), None).await.unwrap_err();

    assert!(matches!(err, DermxError::AnalysisFailed(ref m) if m == "model unavailable"));
    assert_eq!(upload.error(), Some("model unavailable"));
    assert!(upload.result().is_none());
    assert!(upload.selected().is_some());
}

#[tokio::test]
async fn test_non_image_is_never_uploaded() {
    let backend = MockBackend::spawn().await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", b"itchy since tuesday");

    let mut upload = UploadState::new();
    assert!(!upload.drop_paths(&[path]).unwrap());
    assert_eq!(upload.notice(), Some(REJECTION_NOTICE));
    assert!(upload.selected().is_none());

    let err = upload.analyze(&backend.client(), None).await.unwrap_err();
    assert!(matches!(err, DermxError::NoImageSelected));
    assert_eq!(upload.error(), Some("Please select an image file to analyze"));
    assert_eq!(Hits::get(&backend.hits().analyze), 0);
}

#[tokio::test]
async fn test_text_file_with_image_bytes_is_never_uploaded() {
    let backend = MockBackend::spawn().await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", PNG);

    let mut upload = UploadState::new();
    assert!(!upload.select_path(&path).unwrap());
    assert_eq!(upload.notice(), Some(REJECTION_NOTICE));
    assert!(upload.selected().is_none());

    assert!(upload.analyze(&backend.client(), None).await.is_err());
    assert_eq!(Hits::get(&backend.hits().analyze), 0);
}

#[tokio::test]
async fn test_rejected_drop_keeps_previous_image() {
    let backend = MockBackend::spawn().await;
    let dir = TempDir::new().unwrap();
    let image = write_file(&dir, "rash.jpg", b"\xff\xd8\xff\xe0\0\x10JFIF");
    let text = write_file(&dir, "notes.txt", b"not a picture");

    let mut upload = UploadState::new();
    upload.drag_enter();
    assert!(upload.drop_paths(&[image, text.clone()]).unwrap());
    assert!(!upload.is_dragging());

    assert!(!upload.select_path(&text).unwrap());
    assert_eq!(upload.selected().unwrap().name(), "rash.jpg");

    upload.analyze(&backend.client(), None).await.unwrap();
    let record = backend.state.last_upload.lock().unwrap().clone().unwrap();
    assert_eq!(record.content_type.as_deref(), Some("image/jpeg"));
}

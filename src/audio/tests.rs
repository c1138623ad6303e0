use super::*;
use std::io::Write;

#[tokio::test]
async fn test_file_capture_returns_file_bytes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"RIFF\x00\x00\x00\x00WAVE").unwrap();

    let capture = FileCapture::new(file.path());
    let bytes = record(&capture).await.unwrap();
    assert_eq!(bytes, b"RIFF\x00\x00\x00\x00WAVE");
}

#[tokio::test]
async fn test_missing_source_is_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    let capture = FileCapture::new(dir.path().join("nope.ogg"));
    let err = capture.start().await.unwrap_err();
    assert!(matches!(err, ChatError::Capture(_)));
}

#[tokio::test]
async fn test_directory_source_is_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    let capture = FileCapture::new(dir.path());
    assert!(matches!(capture.start().await, Err(ChatError::Capture(_))));
}

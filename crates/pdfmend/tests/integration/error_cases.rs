//! Integration tests for error handling and edge cases.

use pdfmend::config::Config;
use pdfmend::io::SourceReader;
use pdfmend::{PdfMendError, ValidationError, Workspace};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::*;

#[tokio::test]
async fn test_error_nonexistent_input() {
    let err = SourceReader::new()
        .load(&PathBuf::from("/nonexistent/file.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, PdfMendError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_directory_input() {
    let dir = TempDir::new().unwrap();
    let err = SourceReader::new().load(dir.path()).await.unwrap_err();
    assert!(matches!(err, PdfMendError::NotAFile { .. }));
}

#[tokio::test]
async fn test_error_corrupt_input_is_named() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "corrupt.pdf", b"definitely not a pdf");

    let err = SourceReader::new().load(&path).await.unwrap_err();
    assert!(matches!(err, PdfMendError::Load { ref name, .. } if name == "corrupt.pdf"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_load_all_keeps_failures_in_place() {
    let dir = TempDir::new().unwrap();
    let good = write_file(dir.path(), "good.pdf", &pdf_with_pages(2));
    let missing = dir.path().join("missing.pdf");
    let other = write_file(dir.path(), "other.pdf", &pdf_with_pages(1));

    let (results, stats) = SourceReader::new()
        .load_all(&[good, missing, other], 2)
        .await;

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.failure_count, 1);
    assert_eq!(stats.total_pages, 3);
}

#[tokio::test]
async fn test_error_empty_list() {
    let err = Workspace::new().process().await.unwrap_err();
    assert!(matches!(err, PdfMendError::NoFilesToProcess));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_error_edit_without_session() {
    let mut workspace = workspace_with(vec![("a.pdf", pdf_with_pages(1))]);

    let err = workspace.rotate(90).await.unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::NoActiveSession)
    ));
}

#[tokio::test]
async fn test_error_open_out_of_range() {
    let mut workspace = workspace_with(vec![("a.pdf", pdf_with_pages(1))]);

    let err = workspace.open_for_editing(3).await.unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::IndexOutOfRange { .. })
    ));
    assert!(!workspace.is_editing());
}

#[tokio::test]
async fn test_error_invalid_rotation_leaves_document() {
    let mut workspace = workspace_with(vec![("a.pdf", pdf_with_pages(1))]);
    workspace.open_for_editing(0).await.unwrap();
    let before = stored_bytes(workspace.documents(), 0);

    let err = workspace.rotate(45).await.unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::InvalidRotation { degrees: 45 })
    ));
    assert_eq!(stored_bytes(workspace.documents(), 0), before);
    assert!(!workspace.documents().get(0).unwrap().content().is_edited());
}

#[test]
fn test_error_output_is_input() {
    let config = Config {
        inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        output: Some(PathBuf::from("b.pdf")),
        ..Config::default()
    };

    let err = config.validated().unwrap_err();
    assert!(matches!(err, PdfMendError::InvalidConfig { .. }));
}

//! End-to-end runs: load from disk, edit, process, write.

use pdfmend::Workspace;
use pdfmend::config::Config;
use pdfmend::io::{PdfWriter, SourceReader};
use pdfmend::merge::ProcessMode;
use tempfile::TempDir;

use crate::common::*;

async fn load_into_workspace(config: &Config) -> Workspace {
    let (results, stats) = SourceReader::new()
        .load_all(&config.inputs, config.effective_jobs())
        .await;
    assert_eq!(stats.failure_count, 0);

    let mut workspace = Workspace::from_config(config);
    for result in results {
        assert!(workspace.add_document(result.unwrap().document));
    }
    workspace
}

#[tokio::test]
async fn test_merge_files_in_list_order() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        inputs: vec![
            write_file(dir.path(), "first.pdf", &pdf_with_widths(&[101.0, 102.0])),
            write_file(dir.path(), "second.pdf", &pdf_with_widths(&[201.0])),
            write_file(dir.path(), "third.pdf", &pdf_with_widths(&[301.0, 302.0])),
        ],
        output_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let workspace = load_into_workspace(&config).await;
    let output = workspace.process().await.unwrap();
    assert_eq!(output.mode, ProcessMode::Merged);
    assert_eq!(output.file_name, "merged-document.pdf");

    let path = config.output_path_for(&output.file_name);
    let stats = PdfWriter::new().write(output.bytes, &path).await.unwrap();
    assert_eq!(stats.output_path, path);

    let written = std::fs::read(&path).unwrap();
    assert_eq!(
        page_widths(&written),
        vec![101.0, 102.0, 201.0, 301.0, 302.0]
    );
}

#[tokio::test]
async fn test_reorder_then_merge() {
    let mut workspace = workspace_with(vec![
        ("a.pdf", pdf_with_widths(&[1.0])),
        ("b.pdf", pdf_with_widths(&[2.0])),
        ("c.pdf", pdf_with_widths(&[3.0])),
    ]);

    workspace
        .move_document(2, pdfmend::document::MoveDirection::Up)
        .unwrap();
    workspace.remove_document(0).unwrap();

    let output = workspace.process().await.unwrap();
    assert_eq!(page_widths(&output.bytes), vec![3.0, 2.0]);
}

#[tokio::test]
async fn test_edit_single_file_and_save() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        inputs: vec![write_file(
            dir.path(),
            "Scan.PDF",
            &pdf_with_annotations(&[1, 0, 0]),
        )],
        output_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let mut workspace = load_into_workspace(&config).await;
    workspace.open_for_editing(0).await.unwrap();
    workspace.strip_annotations().await.unwrap();
    workspace.rotate(90).await.unwrap();
    workspace.go_to_page(3).unwrap();
    workspace.delete_current_page().await.unwrap();
    workspace.commit_and_close().unwrap();

    let output = workspace.process().await.unwrap();
    assert_eq!(output.mode, ProcessMode::Single);
    assert_eq!(output.file_name, "Scan-processed.pdf");
    assert_eq!(output.notice().message, "PDF processed successfully!");

    let path = config.output_path_for(&output.file_name);
    PdfWriter::new().write(output.bytes, &path).await.unwrap();

    let written = std::fs::read(dir.path().join("Scan-processed.pdf")).unwrap();
    assert_eq!(page_rotations(&written), vec![90, 0]);
    assert_eq!(annotation_count(&written), 0);
}

#[tokio::test]
async fn test_edited_document_merges_with_originals() {
    let mut workspace = workspace_with(vec![
        ("a.pdf", pdf_with_widths(&[10.0, 11.0])),
        ("b.pdf", pdf_with_widths(&[20.0])),
    ]);

    workspace.open_for_editing(0).await.unwrap();
    workspace.delete_page(1).await.unwrap();
    workspace.commit_and_close().unwrap();

    let output = workspace.process().await.unwrap();
    assert_eq!(output.page_count, 2);
    assert_eq!(page_widths(&output.bytes), vec![10.0, 20.0]);
}

#[tokio::test]
async fn test_duplicate_files_are_skipped() {
    let bytes = pdf_with_pages(1);
    let mut workspace = Workspace::new();

    assert!(workspace.add_document(pending("same.pdf", bytes.clone())));
    assert!(!workspace.add_document(pending("same.pdf", bytes)));
    assert_eq!(workspace.documents().len(), 1);
}

//! Editing sessions driven through the workspace.

use pdfmend::document::MoveDirection;
use pdfmend::{NoticeLevel, PageStep, PdfMendError, RenderStatus, ValidationError};

use crate::common::*;

#[tokio::test]
async fn test_rotate_and_navigate() {
    let mut workspace = workspace_with(vec![("scan.pdf", pdf_with_pages(3))]);
    workspace.open_for_editing(0).await.unwrap();

    assert!(workspace.navigate(PageStep::Next).unwrap());
    let report = workspace.rotate(90).await.unwrap();
    assert_eq!(report.notice().message, "Page 2 rotated.");
    assert_eq!(report.cursor.page_number(), 2);

    workspace.go_to_page(3).unwrap();
    workspace.rotate(-90).await.unwrap();

    let bytes = stored_bytes(workspace.documents(), 0);
    assert_eq!(page_rotations(&bytes), vec![0, 90, 270]);
    assert!(workspace.documents().get(0).unwrap().content().is_edited());
}

#[tokio::test]
async fn test_render_follows_cursor() {
    let mut workspace = workspace_with(vec![("sizes.pdf", pdf_with_widths(&[100.0, 200.0]))]);
    workspace.open_for_editing(0).await.unwrap();

    workspace.navigate(PageStep::Next).unwrap();
    match workspace.settle_render().await.unwrap() {
        RenderStatus::Rendered(page) => {
            assert_eq!(page.page_number, 2);
            assert_eq!(page.width, 300);
        }
        other => panic!("unexpected render status: {other:?}"),
    }
}

#[tokio::test]
async fn test_crop_then_reject_oversized_crop() {
    let mut workspace = workspace_with(vec![("scan.pdf", pdf_with_pages(1))]);
    workspace.open_for_editing(0).await.unwrap();

    let report = workspace.crop(50.0, 50.0, 25.0, 25.0).await.unwrap();
    assert_eq!(report.notice().message, "Page 1 cropped.");
    let after_crop = stored_bytes(workspace.documents(), 0);

    let err = workspace.crop(300.0, 300.0, 0.0, 0.0).await.unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::InvalidCrop { .. })
    ));
    assert_eq!(stored_bytes(workspace.documents(), 0), after_crop);
}

#[tokio::test]
async fn test_delete_pages_down_to_one() {
    let mut workspace = workspace_with(vec![("scan.pdf", pdf_with_widths(&[1.0, 2.0, 3.0]))]);
    workspace.open_for_editing(0).await.unwrap();
    workspace.go_to_page(3).unwrap();

    let report = workspace.delete_current_page().await.unwrap();
    assert_eq!(report.notice().message, "Page 3 deleted.");
    assert_eq!(report.cursor.page_number(), 2);

    workspace.delete_page(0).await.unwrap();
    let bytes = stored_bytes(workspace.documents(), 0);
    assert_eq!(page_widths(&bytes), vec![2.0]);

    let err = workspace.delete_current_page().await.unwrap_err();
    assert!(matches!(err.as_validation(), Some(ValidationError::OnlyPage)));
    assert_eq!(stored_bytes(workspace.documents(), 0), bytes);
}

#[tokio::test]
async fn test_strip_annotations() {
    let mut workspace = workspace_with(vec![("notes.pdf", pdf_with_annotations(&[2, 0, 1]))]);
    workspace.open_for_editing(0).await.unwrap();

    let report = workspace.strip_annotations().await.unwrap();
    assert!(report.committed);
    assert_eq!(report.notice().message, "Annotations (comments) removed.");
    assert_eq!(annotation_count(&stored_bytes(workspace.documents(), 0)), 0);

    let report = workspace.strip_annotations().await.unwrap();
    assert!(!report.committed);
    assert_eq!(report.notice().level, NoticeLevel::Info);
}

#[tokio::test]
async fn test_strip_metadata_blocks_compression() {
    let mut workspace = workspace_with(vec![(
        "report.pdf",
        pdf_with_info(2, &[("Title", "Quarterly"), ("Author", "Finance")]),
    )]);
    workspace.open_for_editing(0).await.unwrap();

    workspace.compress().await.unwrap();
    workspace.strip_metadata().await.unwrap();

    let bytes = stored_bytes(workspace.documents(), 0);
    assert_eq!(info_value(&bytes, "Title").as_deref(), Some(""));
    assert_eq!(info_value(&bytes, "Author").as_deref(), Some(""));

    let err = workspace.compress().await.unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::CompressionDisabled)
    ));
    assert_eq!(stored_bytes(workspace.documents(), 0), bytes);
}

#[tokio::test]
async fn test_compression_allowed_again_in_new_session() {
    let mut workspace = workspace_with(vec![("report.pdf", pdf_with_pages(1))]);
    workspace.open_for_editing(0).await.unwrap();
    workspace.strip_metadata().await.unwrap();
    workspace.commit_and_close().unwrap();

    workspace.open_for_editing(0).await.unwrap();
    assert!(workspace.compress().await.is_ok());
}

#[tokio::test]
async fn test_list_locked_while_editing() {
    let mut workspace = workspace_with(vec![
        ("a.pdf", pdf_with_pages(1)),
        ("b.pdf", pdf_with_pages(1)),
    ]);
    workspace.open_for_editing(1).await.unwrap();

    let err = workspace.remove_document(0).unwrap_err();
    assert!(matches!(
        err,
        PdfMendError::Validation(ValidationError::SessionActive)
    ));
    assert!(workspace.move_document(1, MoveDirection::Up).is_err());

    workspace.close_editing();
    assert!(workspace.move_document(1, MoveDirection::Up).unwrap());
    assert_eq!(workspace.documents().get(0).unwrap().name(), "b.pdf");
}

#[tokio::test]
async fn test_commit_and_close_reports_saved() {
    let mut workspace = workspace_with(vec![("a.pdf", pdf_with_pages(2))]);

    let err = workspace.commit_and_close().unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::NoActiveSession)
    ));

    workspace.open_for_editing(0).await.unwrap();
    workspace.rotate(180).await.unwrap();
    let notice = workspace.commit_and_close().unwrap();
    assert_eq!(notice.message, "Changes to PDF saved locally.");
    assert!(!workspace.is_editing());

    // Edits are kept after the session ends.
    let bytes = stored_bytes(workspace.documents(), 0);
    assert_eq!(page_rotations(&bytes), vec![180, 0]);
}

#[tokio::test]
async fn test_failed_open_keeps_previous_session() {
    let mut workspace = workspace_with(vec![
        ("good.pdf", pdf_with_pages(1)),
        ("broken.pdf", b"%PDF-1.5 not really".to_vec()),
    ]);
    workspace.open_for_editing(0).await.unwrap();

    assert!(workspace.open_for_editing(1).await.is_err());
    assert_eq!(workspace.session().unwrap().document_name(), "good.pdf");
}

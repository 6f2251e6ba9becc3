//! Cancellable page rendering.
//!
//! A [`RenderTask`] runs [`RenderHandle::render_page`] on tokio's blocking
//! pool and can be cancelled at any time. Cancellation is cooperative: the
//! task's [`CancellationToken`] is set, the renderer notices it between
//! steps, and the task resolves to [`PdfMendError::RenderCancelled`], which
//! callers treat as "no result" rather than a failure.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::backend::{DocumentRenderer, PreviewRenderer};
//! use pdfmend::render::RenderTask;
//!
//! # async fn example(bytes: Vec<u8>) -> pdfmend::Result<()> {
//! let handle = PreviewRenderer::new().open(&bytes)?;
//!
//! let first = RenderTask::spawn(handle.clone(), 1, 1.5);
//! first.cancel();
//! assert!(first.outcome().await.unwrap_err().is_cancellation());
//!
//! let page = RenderTask::spawn(handle, 2, 1.5).outcome().await?;
//! println!("{}x{}", page.width, page.height);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::{self, JoinHandle};

use crate::backend::RenderHandle;
use crate::error::{PdfMendError, Result};

/// Shared flag for cooperative cancellation.
///
/// All clones observe the same state; cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with a cancellation error for `page_number` if cancelled.
    pub fn check(&self, page_number: usize) -> Result<()> {
        if self.is_cancelled() {
            Err(PdfMendError::RenderCancelled { page: page_number })
        } else {
            Ok(())
        }
    }
}

/// A rendered page preview.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// 1-based page number.
    pub page_number: usize,

    /// Viewport width in pixels at the requested scale.
    pub width: u32,

    /// Viewport height in pixels at the requested scale.
    pub height: u32,

    /// Effective page rotation in degrees.
    pub rotation: i32,

    /// Scale the page was rendered at.
    pub scale: f32,

    /// Number of annotations on the page.
    pub annotations: usize,
}

/// A page render running in the background.
#[derive(Debug)]
pub struct RenderTask {
    page_number: usize,
    token: CancellationToken,
    handle: JoinHandle<Result<RenderedPage>>,
}

impl RenderTask {
    /// Start rendering `page_number` of `handle` at `scale`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<H: RenderHandle>(handle: H, page_number: usize, scale: f32) -> Self {
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let join = task::spawn_blocking(move || {
            worker_token.check(page_number)?;
            handle.render_page(page_number, scale, &worker_token)
        });

        Self {
            page_number,
            token,
            handle: join,
        }
    }

    /// Page being rendered.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
        self.handle.abort();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the render to finish.
    ///
    /// A task cancelled before or while running resolves to
    /// [`PdfMendError::RenderCancelled`] even if the renderer completed.
    pub async fn outcome(self) -> Result<RenderedPage> {
        let page = self.page_number;

        match self.handle.await {
            Ok(_) if self.token.is_cancelled() => Err(PdfMendError::RenderCancelled { page }),
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(PdfMendError::RenderCancelled { page }),
            Err(err) => Err(PdfMendError::render(page, format!("Render task failed: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SlowHandle {
        started: Arc<AtomicUsize>,
    }

    impl RenderHandle for SlowHandle {
        fn page_count(&self) -> usize {
            3
        }

        fn render_page(
            &self,
            page_number: usize,
            scale: f32,
            token: &CancellationToken,
        ) -> Result<RenderedPage> {
            self.started.fetch_add(1, Ordering::SeqCst);
            for _ in 0..50 {
                token.check(page_number)?;
                std::thread::sleep(Duration::from_millis(2));
            }
            if page_number > self.page_count() {
                return Err(PdfMendError::render(page_number, "no such page"));
            }
            Ok(RenderedPage {
                page_number,
                width: (100.0 * scale) as u32,
                height: (200.0 * scale) as u32,
                rotation: 0,
                scale,
                annotations: 0,
            })
        }
    }

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        assert!(token.check(1).is_ok());

        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(clone.check(4).unwrap_err().is_cancellation());
    }

    #[tokio::test]
    async fn test_render_completes() {
        let task = RenderTask::spawn(SlowHandle::default(), 2, 2.0);
        assert_eq!(task.page_number(), 2);

        let page = task.outcome().await.unwrap();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.width, 200);
        assert_eq!(page.height, 400);
    }

    #[tokio::test]
    async fn test_cancelled_render_is_not_an_error() {
        let task = RenderTask::spawn(SlowHandle::default(), 1, 1.0);
        task.cancel();
        assert!(task.is_cancelled());

        let err = task.outcome().await.unwrap_err();
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn test_render_failure_is_reported() {
        let err = RenderTask::spawn(SlowHandle::default(), 9, 1.0)
            .outcome()
            .await
            .unwrap_err();
        assert!(!err.is_cancellation());
        assert!(matches!(err, PdfMendError::Render { page: 9, .. }));
    }
}

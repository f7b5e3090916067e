//! Progress-callback trait for per-page batch events.
//!
//! Inject an [`Arc<dyn LabelProgressCallback>`] via
//! [`crate::config::LabelConfigBuilder::progress_callback`] to receive events
//! as the session walks the pages of a document.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2label::{LabelConfig, LabelProgressCallback, LabelRecord};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl LabelProgressCallback for CountingCallback {
//!     fn on_label_rendered(&self, page_num: usize, total_pages: usize, record: &LabelRecord) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {}/{}: {}", page_num, total_pages, record.order_item);
//!     }
//! }
//!
//! let config = LabelConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { rendered: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::LabelRecord;
use std::sync::Arc;

/// Called by [`crate::session::LabelSession`] as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page numbers count retained (non-blank) pages,
/// 1-indexed.
pub trait LabelProgressCallback: Send + Sync {
    /// Called once after the text is split, before the first page.
    fn on_batch_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a label was saved and appended to the batch.
    fn on_label_rendered(&self, page_num: usize, total_pages: usize, record: &LabelRecord) {
        let _ = (page_num, total_pages, record);
    }

    /// Called when a page yields no record (expected, e.g. no title line).
    fn on_page_skipped(&self, page_num: usize, total_pages: usize, reason: &str) {
        let _ = (page_num, total_pages, reason);
    }

    /// Called when rendering or saving a page's label failed.
    fn on_page_failed(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_batch_complete(&self, total_pages: usize, rendered: usize) {
        let _ = (total_pages, rendered);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl LabelProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::LabelConfig`].
pub type ProgressCallback = Arc<dyn LabelProgressCallback>;

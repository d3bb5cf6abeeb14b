//! Progress-callback trait for extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline classifies the input, picks a strategy and works
//! through the pages of the OCR fallback.
//!
//! # Example
//!
//! ```rust
//! use medreport_ocr::{ExtractionProgressCallback, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     done: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for PageCounter {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page_num}/{total_pages}: {text_len} chars");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(PageCounter { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ExtractError;
use crate::output::{ExtractionStrategy, InputKind};
use std::sync::Arc;

/// Called by the extraction pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: the async
/// entry points run the pipeline on a blocking worker thread.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the input has been classified.
    fn on_extraction_start(&self, kind: InputKind) {
        let _ = kind;
    }

    /// Called when the strategy selector commits to a strategy.
    ///
    /// For PDFs this fires after table extraction has been attempted, so a
    /// fallback is reported as [`ExtractionStrategy::RasterOcr`].
    fn on_strategy_selected(&self, strategy: ExtractionStrategy) {
        let _ = strategy;
    }

    /// Called before a frame is sent to the OCR engine.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number (always 1 for images)
    /// * `total_pages` — pages that will be recognised
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page's text has been recognised and normalised.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once when the final text has been assembled.
    fn on_extraction_complete(&self, strategy: ExtractionStrategy, text_len: usize) {
        let _ = (strategy, text_len);
    }

    /// Called once, instead of `on_extraction_complete`, when extraction
    /// returns an error. Fires for classification errors too, before any
    /// other event.
    fn on_extraction_failed(&self, error: &ExtractError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

//! # medreport-ocr
//!
//! Extract text from scanned medical reports (PDFs and photos) with OCR, and
//! optionally hand that text to an LLM for a plain-language analysis.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Sniff       pdf / image / unsupported, from the extension
//!  ├─ 2. Tables      PDFs only: structured tables from the text layer
//!  ├─ 3. Render      fallback: rasterise each selected page (pdfium)
//!  ├─ 4. Preprocess  contrast → 3×3 blur → cubic upscale
//!  ├─ 5. OCR         tesseract, fixed engine/segmentation modes + whitelist
//!  ├─ 6. Normalise   fix common misreads (`,`→`.`, `O`→`0`, `l`→`1`)
//!  └─ 7. Analyse     optional: one LLM call over the final text
//! ```
//!
//! A PDF's text comes from tables *or* OCR, never a per-page mix: tables win
//! when at least one non-empty table is found; otherwise every selected page
//! goes through OCR, in page order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medreport_ocr::{extract_text, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = extract_text("cbc_report.pdf", &ExtractionConfig::lab_report()).await?;
//!     println!("{}", output.text);
//!     eprintln!("strategy: {}, {} ms", output.strategy, output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `medocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! medreport-ocr = { version = "0.3", default-features = false }
//! ```
//!
//! ## External tools
//!
//! OCR shells out to the `tesseract` binary (override with
//! [`ExtractionConfigBuilder::tesseract_path`]). PDF rendering and table
//! extraction bind to a pdfium shared library at runtime (see
//! [`ExtractionConfigBuilder::pdfium_library_path`]).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_extraction, analyze_report, recommend_specialty};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisKind, ExtractionConfig,
    ExtractionConfigBuilder, NormalizationRules, OcrSettings, PageSelection,
};
pub use error::{ExtractError, TableError};
pub use extract::{extract_text, extract_text_sync, extract_to_file, Extractor};
pub use output::{
    ExtractionOutput, ExtractionStats, ExtractionStrategy, InputDocument, InputKind, PageText,
    ReportAnalysis, Specialty, UNSUPPORTED_FILE_MESSAGE,
};
pub use pipeline::normalize::normalize;
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use pipeline::preprocess::{preprocess, PreprocessOptions};
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use pipeline::sniff::classify;
pub use pipeline::tables::{
    render_tables, ExtractedTable, PdfiumTableExtractor, TableExtractor, TableOutcome,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};

//! Error types for the medreport-ocr library.
//!
//! Only one kind of failure is ever absorbed by the pipeline: a table
//! extraction error, which is reported as [`TableError`] by the extractor and
//! folded into an OCR fallback by the strategy selector. Everything else is
//! fatal and surfaces as [`ExtractError`] from the top-level entry points.
//!
//! An unsupported file type is not an error at all. It is a normal result
//! carrying a fixed message (see [`crate::output::ExtractionStrategy::Unsupported`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the medreport-ocr library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Classification errors ─────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The image could not be decoded (corrupt or truncated file).
    #[error("Could not decode image '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or point\n\
MEDOCR_PDFIUM_LIB at the library (or the directory containing it).\n"
    )]
    PdfiumBindingFailed(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine binary could not be started.
    #[error("OCR engine '{binary}' could not be started: {detail}\nInstall tesseract or pass --tesseract <PATH>.")]
    OcrEngineUnavailable { binary: PathBuf, detail: String },

    /// The OCR engine ran but reported a failure.
    #[error("OCR failed on page {page}: {detail}")]
    OcrEngineFailed { page: usize, detail: String },

    /// A scratch file for a rendered page or frame could not be created.
    #[error("Scratch file error: {detail}")]
    ScratchFile { detail: String },

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// True for the classification family: the input could not be opened at all.
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            ExtractError::FileNotFound { .. } | ExtractError::PermissionDenied { .. }
        )
    }
}

/// Failure reported by a table extractor.
///
/// Never returned from the public entry points: the strategy selector logs it
/// and falls back to OCR.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// The document could not be opened by the table extractor.
    #[error("could not open document: {0}")]
    Open(String),

    /// A page's text layer could not be read.
    #[error("page {page}: {detail}")]
    Page { page: usize, detail: String },
}

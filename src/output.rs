//! Result types produced by the extraction and analysis entry points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Message returned as the text for inputs that are neither PDF nor image.
pub const UNSUPPORTED_FILE_MESSAGE: &str = "Unsupported file type.";

/// Classification of an input file, decided from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pdf,
    Image,
    Unsupported,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputKind::Pdf => "pdf",
            InputKind::Image => "image",
            InputKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// A file path plus its classification. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    path: PathBuf,
    kind: InputKind,
}

impl InputDocument {
    pub(crate) fn new(path: PathBuf, kind: InputKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

/// Which strategy produced the final text.
///
/// For any document exactly one strategy contributes: tables replace OCR for
/// the whole PDF, or OCR covers every selected page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Structured tables from the PDF text layer.
    Tables,
    /// PDF pages rasterised, preprocessed and OCR'd.
    RasterOcr,
    /// A single image preprocessed and OCR'd.
    ImageOcr,
    /// Input type not supported; text is [`UNSUPPORTED_FILE_MESSAGE`].
    Unsupported,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionStrategy::Tables => "tables",
            ExtractionStrategy::RasterOcr => "raster OCR",
            ExtractionStrategy::ImageOcr => "image OCR",
            ExtractionStrategy::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Cleaned text for one OCR'd page (or the single image).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Normalised OCR output for the page.
    pub text: String,
    /// Wall-clock time spent preprocessing and recognising this page.
    pub duration_ms: u64,
}

/// Timing and volume counters for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the PDF (1 for images, 0 for unsupported inputs).
    pub total_pages: usize,
    /// Pages that went through OCR.
    pub ocr_pages: usize,
    /// Non-empty tables rendered into the text.
    pub tables_found: usize,
    /// True when table extraction raised and the failure was absorbed.
    pub table_extraction_failed: bool,
    pub table_duration_ms: u64,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of extracting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Final document text.
    pub text: String,
    pub kind: InputKind,
    pub strategy: ExtractionStrategy,
    /// Per-page OCR text in page order. Empty on the table path.
    pub pages: Vec<PageText>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    pub(crate) fn unsupported() -> Self {
        Self {
            text: UNSUPPORTED_FILE_MESSAGE.to_string(),
            kind: InputKind::Unsupported,
            strategy: ExtractionStrategy::Unsupported,
            pages: Vec::new(),
            stats: ExtractionStats::default(),
        }
    }

    /// True when the text came from a supported extraction and is not blank.
    pub fn has_text(&self) -> bool {
        self.strategy != ExtractionStrategy::Unsupported && !self.text.trim().is_empty()
    }
}

/// Extracted text plus the LLM's analysis of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub extraction: ExtractionOutput,
    /// Model output; `None` when the extraction produced nothing to analyse.
    pub analysis: Option<String>,
    /// Specialist suggested from keywords in the analysis.
    pub specialty: Option<Specialty>,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

impl ReportAnalysis {
    /// Plain-text report combining the extracted text and the analysis.
    pub fn to_report_string(&self) -> String {
        format!(
            "EXTRACTED TEXT:\n{}\n\n{}\n\nAI ANALYSIS:\n{}",
            self.extraction.text,
            "=".repeat(50),
            self.analysis.as_deref().unwrap_or("")
        )
    }
}

/// Kind of doctor to consult, suggested from the analysis text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialty {
    GeneralPhysician,
    Cardiologist,
    Neurologist,
    Orthopedic,
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Specialty::GeneralPhysician => "General Physician",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Neurologist => "Neurologist",
            Specialty::Orthopedic => "Orthopedic",
        };
        f.write_str(s)
    }
}

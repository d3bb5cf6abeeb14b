//! Configuration types for extraction and analysis.
//!
//! Every knob that the pipeline reads lives in [`ExtractionConfig`], passed in
//! when an [`crate::Extractor`] is constructed. Nothing is read from
//! process-wide globals: the engine binary path, contrast parameters, resize
//! factor, DPI and character whitelist all travel with the config value, so two
//! extractors with different settings can coexist in one process.
//!
//! Summarisation is configured separately through [`AnalysisConfig`] because
//! extraction never needs an LLM provider or API key.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Character whitelist for lab reports: digits, ASCII letters and the
/// punctuation that appears in values and units.
pub const LAB_REPORT_WHITELIST: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.,:/-()% ";

/// Configuration for document text extraction.
///
/// Built via [`ExtractionConfig::builder()`], or use one of the profiles
/// [`ExtractionConfig::lab_report()`] (the default) and
/// [`ExtractionConfig::medicine_label()`].
///
/// # Example
/// ```rust
/// use medreport_ocr::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .contrast(1.6, 10.0)
///     .resize_percent(Some(150))
///     .tesseract_path("/usr/local/bin/tesseract")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OCR engine binary. Default: `tesseract`, resolved through `PATH`.
    pub tesseract_path: PathBuf,

    /// pdfium shared library, or the directory that contains it.
    /// If None, looks in the working directory and then the system library path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Contrast gain applied before blur. Range: (0, 10]. Default: 1.5.
    pub contrast_alpha: f32,

    /// Brightness offset applied with the contrast gain. Range: −255–255. Default: 0.
    pub contrast_beta: f32,

    /// Apply the 3×3 Gaussian blur after the contrast step. Default: true.
    pub denoise: bool,

    /// Upscale to this percentage of the original size after blurring.
    /// `None` disables resizing. Range: 10–800. Default: `Some(200)`.
    pub resize_percent: Option<u32>,

    /// Rendering DPI for PDF pages on the OCR path. Range: 72–600. Default: 400.
    pub dpi: u32,

    /// Longest rendered edge in pixels, independent of DPI. Default: 8000.
    ///
    /// A 400-DPI render of a poster-sized page would otherwise allocate
    /// hundreds of megabytes for a single frame.
    pub max_rendered_pixels: u32,

    /// Engine mode, segmentation mode, whitelist and language for the OCR engine.
    pub ocr: OcrSettings,

    /// Character substitution rules applied to every OCR result.
    pub normalization: NormalizationRules,

    /// Try structured table extraction before OCR for PDFs. Default: true.
    pub table_extraction: bool,

    /// Minimum consecutive multi-cell lines for the pdfium extractor to
    /// report a table. Default: 2.
    pub table_min_rows: usize,

    /// Page selection, applied to both strategies. Default: all pages.
    pub pages: PageSelection,

    /// Directory for rendered page scratch files. Default: the system temp dir.
    pub scratch_dir: Option<PathBuf>,

    /// Save every preprocessed frame as `frame-{page}.png` here. Default: None.
    pub debug_frames_dir: Option<PathBuf>,

    /// Optional progress events sink.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            pdfium_library_path: None,
            contrast_alpha: 1.5,
            contrast_beta: 0.0,
            denoise: true,
            resize_percent: Some(200),
            dpi: 400,
            max_rendered_pixels: 8000,
            ocr: OcrSettings::default(),
            normalization: NormalizationRules::default(),
            table_extraction: true,
            table_min_rows: 2,
            pages: PageSelection::default(),
            scratch_dir: None,
            debug_frames_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("tesseract_path", &self.tesseract_path)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("contrast_alpha", &self.contrast_alpha)
            .field("contrast_beta", &self.contrast_beta)
            .field("denoise", &self.denoise)
            .field("resize_percent", &self.resize_percent)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr", &self.ocr)
            .field("normalization", &self.normalization)
            .field("table_extraction", &self.table_extraction)
            .field("table_min_rows", &self.table_min_rows)
            .field("pages", &self.pages)
            .field("scratch_dir", &self.scratch_dir)
            .field("debug_frames_dir", &self.debug_frames_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder starting from the lab-report defaults.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Settings tuned for printed lab reports: moderate contrast, blur,
    /// 2× upscale, numeric whitelist and lab-value substitutions.
    pub fn lab_report() -> Self {
        Self::default()
    }

    /// Settings tuned for photographed medicine packaging: stronger contrast
    /// with a brightness lift, no blur or resize, LSTM-only engine, no
    /// whitelist and alphanumeric cleanup.
    pub fn medicine_label() -> Self {
        Self {
            contrast_alpha: 1.8,
            contrast_beta: 30.0,
            denoise: false,
            resize_percent: None,
            ocr: OcrSettings {
                engine_mode: 1,
                page_segmentation: 6,
                char_whitelist: None,
                language: None,
            },
            normalization: NormalizationRules::Alphanumeric,
            ..Self::default()
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Start from an existing config (e.g. a profile) instead of the defaults.
    pub fn from_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn contrast(mut self, alpha: f32, beta: f32) -> Self {
        self.config.contrast_alpha = alpha;
        self.config.contrast_beta = beta;
        self
    }

    pub fn denoise(mut self, v: bool) -> Self {
        self.config.denoise = v;
        self
    }

    pub fn resize_percent(mut self, pct: Option<u32>) -> Self {
        self.config.resize_percent = pct;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr(mut self, settings: OcrSettings) -> Self {
        self.config.ocr = settings;
        self
    }

    pub fn engine_mode(mut self, oem: u8) -> Self {
        self.config.ocr.engine_mode = oem;
        self
    }

    pub fn page_segmentation(mut self, psm: u8) -> Self {
        self.config.ocr.page_segmentation = psm;
        self
    }

    pub fn char_whitelist(mut self, whitelist: Option<String>) -> Self {
        self.config.ocr.char_whitelist = whitelist;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.language = Some(lang.into());
        self
    }

    pub fn normalization(mut self, rules: NormalizationRules) -> Self {
        self.config.normalization = rules;
        self
    }

    pub fn table_extraction(mut self, v: bool) -> Self {
        self.config.table_extraction = v;
        self
    }

    pub fn table_min_rows(mut self, n: usize) -> Self {
        self.config.table_min_rows = n;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn debug_frames_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.debug_frames_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.tesseract_path.as_os_str().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR engine path must not be empty".into(),
            ));
        }
        if !(c.contrast_alpha > 0.0 && c.contrast_alpha <= 10.0) {
            return Err(ExtractError::InvalidConfig(format!(
                "Contrast alpha must be in (0, 10], got {}",
                c.contrast_alpha
            )));
        }
        if !(-255.0..=255.0).contains(&c.contrast_beta) {
            return Err(ExtractError::InvalidConfig(format!(
                "Contrast beta must be −255–255, got {}",
                c.contrast_beta
            )));
        }
        if let Some(pct) = c.resize_percent {
            if !(10..=800).contains(&pct) {
                return Err(ExtractError::InvalidConfig(format!(
                    "Resize percentage must be 10–800, got {pct}"
                )));
            }
        }
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.ocr.engine_mode > 3 {
            return Err(ExtractError::InvalidConfig(format!(
                "OCR engine mode must be 0–3, got {}",
                c.ocr.engine_mode
            )));
        }
        if c.ocr.page_segmentation > 13 {
            return Err(ExtractError::InvalidConfig(format!(
                "Page segmentation mode must be 0–13, got {}",
                c.ocr.page_segmentation
            )));
        }
        if c.table_min_rows == 0 {
            return Err(ExtractError::InvalidConfig(
                "Table minimum rows must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── OCR engine settings ──────────────────────────────────────────────────

/// Settings forwarded to the OCR engine on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// `--oem`: 0 legacy, 1 LSTM, 2 both, 3 engine default. Default: 3.
    pub engine_mode: u8,
    /// `--psm`: page segmentation mode. Default: 6 (a single uniform block).
    pub page_segmentation: u8,
    /// `tessedit_char_whitelist`. Default: [`LAB_REPORT_WHITELIST`].
    pub char_whitelist: Option<String>,
    /// `-l`: language pack(s), e.g. `eng+deu`. Default: engine default.
    pub language: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            engine_mode: 3,
            page_segmentation: 6,
            char_whitelist: Some(LAB_REPORT_WHITELIST.to_string()),
            language: None,
        }
    }
}

impl OcrSettings {
    /// Engine arguments as separate argv entries (no shell quoting needed).
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_segmentation.to_string(),
        ];
        if let Some(ref lang) = self.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        if let Some(ref wl) = self.char_whitelist {
            args.push("-c".to_string());
            args.push(format!("tessedit_char_whitelist={wl}"));
        }
        args
    }

    /// The same arguments as one configuration string, for logs.
    pub fn config_string(&self) -> String {
        self.args().join(" ")
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which substitution rules the normaliser applies to OCR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizationRules {
    /// comma→period, `O`→`0`, `l`→`1`. Tuned for lab values. (default)
    #[default]
    LabValues,
    /// Lowercase and keep only ASCII letters, digits and whitespace.
    Alphanumeric,
    /// Leave the engine output untouched.
    None,
}

/// Specifies which pages of a PDF to process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

// ── Analysis ─────────────────────────────────────────────────────────────

/// What the LLM is asked to produce from the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisKind {
    /// Report type, values, ranges, interpretation, abnormal findings, advice. (default)
    #[default]
    FullAnalysis,
    /// A short plain-language summary.
    QuickSummary,
    /// Only the measured values with units.
    ValueExtraction,
    /// Medicine name, dose, use, instructions and warnings from packaging text.
    MedicineLabel,
}

/// Configuration for LLM summarisation of extracted text.
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// LLM provider name (e.g. "gemini", "openai", "openrouter").
    pub provider_name: Option<String>,

    /// Model identifier. If None, uses [`DEFAULT_ANALYSIS_MODEL`].
    pub model: Option<String>,

    /// Prompt family. Default: [`AnalysisKind::FullAnalysis`].
    pub kind: AnalysisKind,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens generated. Default: 2048.
    pub max_tokens: usize,

    /// Retries on API failure. Default: 0 (a single call).
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Custom prompt template; `{text}` is replaced with the extracted text.
    pub prompt_template: Option<String>,
}

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: None,
            provider_name: None,
            model: None,
            kind: AnalysisKind::default(),
            temperature: 0.2,
            max_tokens: 2048,
            max_retries: 0,
            retry_backoff_ms: 500,
            prompt_template: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("kind", &self.kind)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("prompt_template", &self.prompt_template)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn kind(mut self, kind: AnalysisKind) -> Self {
        self.config.kind = kind;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, ExtractError> {
        if self.config.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if let Some(ref t) = self.config.prompt_template {
            if !t.contains("{text}") {
                return Err(ExtractError::InvalidConfig(
                    "Prompt template must contain a {text} placeholder".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

//! Extraction entry points and the strategy selector.
//!
//! ## Strategy selection
//!
//! ```text
//! classify ─┬─ unsupported ─▶ "Unsupported file type."
//!           ├─ image ───────▶ preprocess ─▶ OCR ─▶ normalise
//!           └─ pdf ─▶ tables ─┬─ Found ─────────────▶ rendered table blocks
//!                             └─ Empty | Failed ─▶ rasterise every selected page
//!                                                  ─▶ preprocess ─▶ OCR ─▶ normalise
//! ```
//!
//! A PDF's text comes from exactly one strategy: tables for the whole
//! document, or OCR for every selected page. Only a table failure is
//! absorbed; a rasterisation or OCR failure aborts the extraction.
//!
//! The pipeline itself is blocking. [`extract_text`] and
//! [`Extractor::extract_async`] run it on Tokio's blocking pool.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{
    ExtractionOutput, ExtractionStats, ExtractionStrategy, InputKind, PageText,
};
use crate::pipeline::normalize::normalize;
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::preprocess::{load_frame, preprocess, PreprocessOptions};
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::pipeline::sniff::classify;
use crate::pipeline::tables::{
    render_tables, PdfiumTableExtractor, TableExtractor, TableOutcome,
};
use image::{GrayImage, ImageFormat};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the extraction pipeline with a fixed config and set of collaborators.
///
/// Cloning is cheap: the collaborators are shared behind `Arc`s.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
    tables: Arc<dyn TableExtractor>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// An extractor using the tesseract CLI and pdfium.
    pub fn new(config: ExtractionConfig) -> Self {
        let ocr = TesseractCli::new(config.tesseract_path.clone())
            .with_scratch_dir(config.scratch_dir.clone());
        let rasterizer = PdfiumRasterizer::new(config.pdfium_library_path.clone());
        let tables =
            PdfiumTableExtractor::new(config.pdfium_library_path.clone(), config.table_min_rows);
        Self::with_components(config, Arc::new(ocr), Arc::new(rasterizer), Arc::new(tables))
    }

    /// An extractor with caller-supplied collaborators.
    pub fn with_components(
        config: ExtractionConfig,
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
        tables: Arc<dyn TableExtractor>,
    ) -> Self {
        Self {
            config,
            ocr,
            rasterizer,
            tables,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the text of one document. Blocking.
    ///
    /// # Errors
    /// Classification, decode, rasterisation and OCR failures are returned.
    /// An unsupported extension is not an error: the output carries
    /// [`crate::output::UNSUPPORTED_FILE_MESSAGE`].
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<ExtractionOutput, ExtractError> {
        let result = self.run(path.as_ref());
        if let (Err(e), Some(cb)) = (&result, &self.config.progress_callback) {
            cb.on_extraction_failed(e);
        }
        result
    }

    fn run(&self, path: &Path) -> Result<ExtractionOutput, ExtractError> {
        let total_start = Instant::now();
        let doc = classify(path)?;
        info!("Extracting {} ({})", doc.path().display(), doc.kind());

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_start(doc.kind());
        }

        let mut output = match doc.kind() {
            InputKind::Unsupported => {
                info!("Unsupported file type: {}", doc.path().display());
                self.strategy_selected(ExtractionStrategy::Unsupported);
                ExtractionOutput::unsupported()
            }
            InputKind::Image => self.extract_image(doc.path())?,
            InputKind::Pdf => self.extract_pdf(doc.path())?,
        };

        output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!(
            "Extraction complete: strategy={}, {} chars in {}ms",
            output.strategy,
            output.text.len(),
            output.stats.total_duration_ms
        );

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_complete(output.strategy, output.text.len());
        }
        Ok(output)
    }

    /// [`Extractor::extract`] on Tokio's blocking thread pool.
    pub async fn extract_async(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ExtractionOutput, ExtractError> {
        let this = self.clone();
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || this.extract(path))
            .await
            .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {e}")))?
    }

    fn strategy_selected(&self, strategy: ExtractionStrategy) {
        info!("Strategy selected: {}", strategy);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_strategy_selected(strategy);
        }
    }

    // ── Images ───────────────────────────────────────────────────────────

    fn extract_image(&self, path: &Path) -> Result<ExtractionOutput, ExtractError> {
        self.strategy_selected(ExtractionStrategy::ImageOcr);

        let frame = load_frame(path)?;
        let page = self.recognize_frame(&frame, 1, 1)?;
        let stats = ExtractionStats {
            total_pages: 1,
            ocr_pages: 1,
            ocr_duration_ms: page.duration_ms,
            ..Default::default()
        };

        Ok(ExtractionOutput {
            text: page.text.clone(),
            kind: InputKind::Image,
            strategy: ExtractionStrategy::ImageOcr,
            pages: vec![page],
            stats,
        })
    }

    // ── PDFs ─────────────────────────────────────────────────────────────

    fn extract_pdf(&self, path: &Path) -> Result<ExtractionOutput, ExtractError> {
        let total_pages = self.rasterizer.page_count(path)?;
        let indices = self.config.pages.to_indices(total_pages);
        if indices.is_empty() {
            return Err(ExtractError::InvalidConfig(format!(
                "Page selection {:?} matches none of the {} pages",
                self.config.pages, total_pages
            )));
        }
        debug!("Selected {} of {} pages", indices.len(), total_pages);

        let mut stats = ExtractionStats {
            total_pages,
            ..Default::default()
        };

        let table_start = Instant::now();
        let outcome = if self.config.table_extraction {
            TableOutcome::from_result(self.tables.extract_tables(path, &indices))
        } else {
            debug!("Table extraction disabled");
            TableOutcome::Empty
        };
        stats.table_duration_ms = table_start.elapsed().as_millis() as u64;

        match outcome {
            TableOutcome::Found(tables) => {
                info!("Found {} table(s), skipping OCR", tables.len());
                self.strategy_selected(ExtractionStrategy::Tables);
                stats.tables_found = tables.len();
                return Ok(ExtractionOutput {
                    text: render_tables(&tables),
                    kind: InputKind::Pdf,
                    strategy: ExtractionStrategy::Tables,
                    pages: Vec::new(),
                    stats,
                });
            }
            TableOutcome::Empty => {
                info!("No tables found, falling back to OCR");
            }
            TableOutcome::Failed(e) => {
                warn!("Table extraction failed ({}), falling back to OCR", e);
                stats.table_extraction_failed = true;
            }
        }

        self.strategy_selected(ExtractionStrategy::RasterOcr);
        self.ocr_pdf_pages(path, &indices, stats)
    }

    fn ocr_pdf_pages(
        &self,
        path: &Path,
        indices: &[usize],
        mut stats: ExtractionStats,
    ) -> Result<ExtractionOutput, ExtractError> {
        let render_start = Instant::now();
        let mut rendered = self.rasterizer.rasterize(
            path,
            self.config.dpi,
            self.config.max_rendered_pixels,
            indices,
        )?;
        rendered.sort_by_key(|(idx, _)| *idx);
        stats.render_duration_ms = render_start.elapsed().as_millis() as u64;
        info!("Rendered {} page(s) for OCR", rendered.len());

        let total = rendered.len();
        let mut text = String::new();
        let mut pages = Vec::with_capacity(total);

        for (idx, image) in rendered {
            let page_num = idx + 1;

            // The scratch file lives until the end of this iteration; its
            // Drop removes it on every exit path, including `?` below.
            let scratch = self.scratch_file("page-")?;
            image
                .save_with_format(scratch.path(), ImageFormat::Png)
                .map_err(|e| ExtractError::ScratchFile {
                    detail: format!("{}: {e}", scratch.path().display()),
                })?;
            let frame = load_frame(scratch.path())?;

            let page = self.recognize_frame(&frame, page_num, total)?;
            stats.ocr_duration_ms += page.duration_ms;
            text.push_str(&page.text);
            text.push('\n');
            pages.push(page);
        }
        stats.ocr_pages = pages.len();

        Ok(ExtractionOutput {
            text,
            kind: InputKind::Pdf,
            strategy: ExtractionStrategy::RasterOcr,
            pages,
            stats,
        })
    }

    // ── Shared OCR step ──────────────────────────────────────────────────

    fn recognize_frame(
        &self,
        frame: &GrayImage,
        page_num: usize,
        total: usize,
    ) -> Result<PageText, ExtractError> {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_page_start(page_num, total);
        }
        let start = Instant::now();

        let prepared = preprocess(frame, &PreprocessOptions::from(&self.config));
        self.save_debug_frame(&prepared, page_num);

        let raw = self.ocr.recognize(&prepared, &self.config.ocr, page_num)?;
        let cleaned = normalize(&raw, self.config.normalization);
        debug!(
            "Page {}: {} raw chars, {} after normalisation",
            page_num,
            raw.len(),
            cleaned.len()
        );

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_page_complete(page_num, total, cleaned.len());
        }
        Ok(PageText {
            page_num,
            text: cleaned,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn scratch_file(&self, prefix: &str) -> Result<tempfile::NamedTempFile, ExtractError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".png");
        match self.config.scratch_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractError::ScratchFile {
            detail: e.to_string(),
        })
    }

    fn save_debug_frame(&self, frame: &GrayImage, page_num: usize) {
        let Some(ref dir) = self.config.debug_frames_dir else {
            return;
        };
        let target = dir.join(format!("frame-{page_num}.png"));
        let result = std::fs::create_dir_all(dir)
            .map_err(|e| e.to_string())
            .and_then(|_| {
                frame
                    .save_with_format(&target, ImageFormat::Png)
                    .map_err(|e| e.to_string())
            });
        match result {
            Ok(()) => debug!("Saved debug frame {}", target.display()),
            Err(e) => warn!("Could not save debug frame {}: {}", target.display(), e),
        }
    }
}

// ── Free-function entry points ───────────────────────────────────────────────

/// Extract the text of a PDF or image file.
///
/// This is the primary entry point for the library. The blocking pipeline
/// runs on `spawn_blocking`, so this is safe to await from any Tokio task.
///
/// # Example
/// ```rust,no_run
/// use medreport_ocr::{extract_text, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = extract_text("blood_panel.pdf", &ExtractionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_text(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    Extractor::new(config.clone()).extract_async(path).await
}

/// Blocking variant of [`extract_text`] for callers without a runtime.
pub fn extract_text_sync(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    Extractor::new(config.clone()).extract(path)
}

/// Extract a document and write its text to a file.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial file behind.
pub async fn extract_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let output = extract_text(path, config).await?;
    write_atomically(output_path.as_ref(), &output.text).await?;
    Ok(output.stats)
}

pub(crate) async fn write_atomically(path: &Path, contents: &str) -> Result<(), ExtractError> {
    let write_err = |source| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/nested/report.txt");
        write_atomically(&target, "Hb 13.5\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "Hb 13.5\n");
        let names: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("report.txt")]);
    }

    #[test]
    fn unsupported_input_needs_no_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        // Neither tesseract nor pdfium is touched for an unsupported file.
        let out = Extractor::new(ExtractionConfig::default())
            .extract(&path)
            .unwrap();
        assert_eq!(out.strategy, ExtractionStrategy::Unsupported);
        assert_eq!(out.text, crate::output::UNSUPPORTED_FILE_MESSAGE);
    }
}

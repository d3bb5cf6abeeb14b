//! Integration tests for the strategy selector.
//!
//! The OCR engine, rasteriser and table extractor are replaced by stubs, so
//! these run without tesseract or pdfium installed. Input files only need to
//! exist: classification looks at the extension, and the stubs never read
//! the PDF bytes.

use image::{DynamicImage, GrayImage, Luma};
use medreport_ocr::{
    extract_to_file, ExtractError, ExtractedTable, ExtractionConfig, ExtractionProgressCallback,
    ExtractionStrategy, Extractor, InputKind, OcrEngine, OcrSettings, PageRasterizer,
    PageSelection, TableError, TableExtractor, UNSUPPORTED_FILE_MESSAGE,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Returns canned text per page and records what it was given.
#[derive(Default)]
struct StubOcr {
    /// Text returned for every page; `{page}` is replaced by the page number.
    template: String,
    /// Fail with `OcrEngineFailed` on this page.
    fail_on_page: Option<usize>,
    /// Directory whose entry count is sampled on every call.
    watch_dir: Option<PathBuf>,
    calls: AtomicUsize,
    pages_seen: Mutex<Vec<usize>>,
    frame_sizes: Mutex<Vec<(u32, u32)>>,
    scratch_entries: Mutex<Vec<usize>>,
    last_args: Mutex<Vec<String>>,
}

impl StubOcr {
    fn returning(template: &str) -> Self {
        Self {
            template: template.to_string(),
            ..Default::default()
        }
    }
}

impl OcrEngine for StubOcr {
    fn recognize(
        &self,
        frame: &GrayImage,
        settings: &OcrSettings,
        page_num: usize,
    ) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages_seen.lock().unwrap().push(page_num);
        self.frame_sizes.lock().unwrap().push(frame.dimensions());
        *self.last_args.lock().unwrap() = settings.args();
        if let Some(ref dir) = self.watch_dir {
            let n = std::fs::read_dir(dir).unwrap().count();
            self.scratch_entries.lock().unwrap().push(n);
        }

        if self.fail_on_page == Some(page_num) {
            return Err(ExtractError::OcrEngineFailed {
                page: page_num,
                detail: "stub engine failure".into(),
            });
        }
        Ok(self.template.replace("{page}", &page_num.to_string()))
    }
}

/// A PDF with `pages` blank pages.
struct StubRasterizer {
    pages: usize,
    fail: bool,
    rasterize_calls: AtomicUsize,
}

impl StubRasterizer {
    fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            fail: false,
            rasterize_calls: AtomicUsize::new(0),
        }
    }
}

impl PageRasterizer for StubRasterizer {
    fn page_count(&self, _pdf_path: &Path) -> Result<usize, ExtractError> {
        Ok(self.pages)
    }

    fn rasterize(
        &self,
        _pdf_path: &Path,
        _dpi: u32,
        _max_pixels: u32,
        page_indices: &[usize],
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractError> {
        self.rasterize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExtractError::RasterisationFailed {
                page: 1,
                detail: "stub render failure".into(),
            });
        }
        Ok(page_indices
            .iter()
            .filter(|&&i| i < self.pages)
            .map(|&i| {
                let frame = GrayImage::from_pixel(12, 8, Luma([180]));
                (i, DynamicImage::ImageLuma8(frame))
            })
            .collect())
    }
}

struct StubTables {
    result: Result<Vec<ExtractedTable>, TableError>,
    calls: AtomicUsize,
    indices_seen: Mutex<Vec<usize>>,
}

impl StubTables {
    fn new(result: Result<Vec<ExtractedTable>, TableError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            indices_seen: Mutex::new(Vec::new()),
        }
    }
}

impl TableExtractor for StubTables {
    fn extract_tables(
        &self,
        _pdf_path: &Path,
        page_indices: &[usize],
    ) -> Result<Vec<ExtractedTable>, TableError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.indices_seen.lock().unwrap() = page_indices.to_vec();
        self.result.clone()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn table(page_num: usize, rows: &[&[&str]]) -> ExtractedTable {
    ExtractedTable {
        page_num,
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

/// Create an empty file with the given name in `dir`.
fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4 stub").unwrap();
    path
}

fn extractor(
    config: ExtractionConfig,
    ocr: &Arc<StubOcr>,
    rasterizer: &Arc<StubRasterizer>,
    tables: &Arc<StubTables>,
) -> Extractor {
    Extractor::with_components(config, ocr.clone(), rasterizer.clone(), tables.clone())
}

// ── Tables strategy ──────────────────────────────────────────────────────────

#[test]
fn single_table_replaces_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "report.pdf");

    let ocr = Arc::new(StubOcr::returning("should never appear"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![table(
        1,
        &[&["Hemoglobin", "13.5", "g/dL"]],
    )])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap();

    assert_eq!(out.text, "--- Table 1 ---\nHemoglobin 13.5 g/dL\n");
    assert_eq!(out.kind, InputKind::Pdf);
    assert_eq!(out.strategy, ExtractionStrategy::Tables);
    assert_eq!(out.stats.tables_found, 1);
    assert!(out.pages.is_empty());
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    assert_eq!(raster.rasterize_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn several_tables_are_numbered_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "panel.pdf");

    let ocr = Arc::new(StubOcr::returning("unused"));
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Ok(vec![
        table(1, &[&["WBC", "7.2"], &["RBC", "4.8"]]),
        table(1, &[&["", ""]]),
        table(2, &[&["Creatinine", "0.9", "mg/dL"]]),
    ])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap();

    // The blank table is dropped and does not consume a label.
    assert_eq!(
        out.text,
        "--- Table 1 ---\nWBC 7.2\nRBC 4.8\n--- Table 2 ---\nCreatinine 0.9 mg/dL\n"
    );
    assert_eq!(out.stats.tables_found, 2);
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

// ── OCR fallback ─────────────────────────────────────────────────────────────

#[test]
fn table_failure_falls_back_to_ocr_in_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("Page {page}: Glucose 95,2"));
    let raster = Arc::new(StubRasterizer::with_pages(3));
    let tables = Arc::new(StubTables::new(Err(TableError::Open(
        "no text layer".into(),
    ))));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap();

    assert_eq!(
        out.text,
        "Page 1: G1ucose 95.2\nPage 2: G1ucose 95.2\nPage 3: G1ucose 95.2\n"
    );
    assert_eq!(out.strategy, ExtractionStrategy::RasterOcr);
    assert!(out.stats.table_extraction_failed);
    assert_eq!(out.stats.ocr_pages, 3);
    assert_eq!(*ocr.pages_seen.lock().unwrap(), vec![1, 2, 3]);
    let nums: Vec<usize> = out.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(nums, vec![1, 2, 3]);
}

#[test]
fn empty_tables_fall_back_to_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("HbA1c 5,4 %"));
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Ok(vec![table(1, &[&[" ", ""]])])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap();

    assert_eq!(out.text, "HbA1c 5.4 %\nHbA1c 5.4 %\n");
    assert_eq!(out.strategy, ExtractionStrategy::RasterOcr);
    assert!(!out.stats.table_extraction_failed);
    assert_eq!(out.stats.tables_found, 0);
}

#[test]
fn disabled_table_extraction_goes_straight_to_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("WBC 7.2"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![table(1, &[&["a", "b"]])])));
    let config = ExtractionConfig::builder()
        .table_extraction(false)
        .build()
        .unwrap();

    let out = extractor(config, &ocr, &raster, &tables).extract(&pdf).unwrap();

    assert_eq!(out.text, "WBC 7.2\n");
    assert_eq!(tables.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn fallback_frames_are_preprocessed_with_config_settings() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap();

    // 12x8 rendered page, upscaled to 200%.
    assert_eq!(*ocr.frame_sizes.lock().unwrap(), vec![(24, 16)]);
    let args = ocr.last_args.lock().unwrap().clone();
    assert_eq!(&args[..4], &["--oem", "3", "--psm", "6"]);
    assert!(args[5].starts_with("tessedit_char_whitelist="));
}

#[test]
fn page_selection_applies_to_both_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("p{page}"));
    let raster = Arc::new(StubRasterizer::with_pages(4));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .pages(PageSelection::Set(vec![4, 2, 4]))
        .build()
        .unwrap();

    let out = extractor(config, &ocr, &raster, &tables).extract(&pdf).unwrap();

    assert_eq!(*tables.indices_seen.lock().unwrap(), vec![1, 3]);
    assert_eq!(out.text, "p2\np4\n");
    assert_eq!(out.stats.total_pages, 4);
}

#[test]
fn selection_outside_the_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(9))
        .build()
        .unwrap();

    let err = extractor(config, &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidConfig(_)));
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

// ── Failure propagation and cleanup ──────────────────────────────────────────

#[test]
fn ocr_failure_propagates_and_removes_scratch_files() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");
    let scratch = tempfile::tempdir().unwrap();

    let ocr = Arc::new(StubOcr {
        template: "ok".into(),
        fail_on_page: Some(2),
        watch_dir: Some(scratch.path().to_path_buf()),
        ..Default::default()
    });
    let raster = Arc::new(StubRasterizer::with_pages(3));
    let tables = Arc::new(StubTables::new(Err(TableError::Open("scan".into()))));
    let config = ExtractionConfig::builder()
        .scratch_dir(scratch.path())
        .build()
        .unwrap();

    let err = extractor(config, &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap_err();

    assert!(
        matches!(err, ExtractError::OcrEngineFailed { page: 2, .. }),
        "got {err:?}"
    );
    // Exactly one page file existed while each page was recognised...
    assert_eq!(*ocr.scratch_entries.lock().unwrap(), vec![1, 1]);
    // ...and none survive the failure. Page 3 was never attempted.
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    assert_eq!(*ocr.pages_seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn successful_fallback_leaves_no_scratch_files() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");
    let scratch = tempfile::tempdir().unwrap();

    let ocr = Arc::new(StubOcr::returning("ok"));
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .scratch_dir(scratch.path())
        .build()
        .unwrap();

    extractor(config, &ocr, &raster, &tables).extract(&pdf).unwrap();
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn rasterisation_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer {
        fail: true,
        ..StubRasterizer::with_pages(2)
    });
    let tables = Arc::new(StubTables::new(Err(TableError::Open("scan".into()))));

    let err = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap_err();
    assert!(matches!(err, ExtractError::RasterisationFailed { .. }));
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

// ── Images ───────────────────────────────────────────────────────────────────

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(w, h, |x, y| Luma([((x * 17 + y * 5) % 256) as u8]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn image_is_recognised_and_normalised() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "scan.png", 20, 10);

    let ocr = Arc::new(StubOcr::returning("Glucose: 95,2 mg/dL"));
    let raster = Arc::new(StubRasterizer::with_pages(0));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&png)
        .unwrap();

    assert_eq!(out.text, "G1ucose: 95.2 mg/dL");
    assert_eq!(out.kind, InputKind::Image);
    assert_eq!(out.strategy, ExtractionStrategy::ImageOcr);
    assert_eq!(*ocr.frame_sizes.lock().unwrap(), vec![(40, 20)]);
    assert_eq!(tables.calls.load(Ordering::SeqCst), 0);
    assert_eq!(raster.rasterize_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn medicine_label_profile_keeps_size_and_cleans_text() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_png(dir.path(), "box.PNG", 16, 16);

    let ocr = Arc::new(StubOcr::returning("  Paracetamol 500mg!\nTablets (IP)\n"));
    let raster = Arc::new(StubRasterizer::with_pages(0));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    let out = extractor(ExtractionConfig::medicine_label(), &ocr, &raster, &tables)
        .extract(&photo)
        .unwrap();

    assert_eq!(out.text, "paracetamol 500mg\ntablets ip");
    assert_eq!(*ocr.frame_sizes.lock().unwrap(), vec![(16, 16)]);
    let args = ocr.last_args.lock().unwrap().clone();
    assert_eq!(args, vec!["--oem", "1", "--psm", "6"]);
}

#[test]
fn corrupt_image_is_a_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"\xFF\xD8 not really a jpeg").unwrap();

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(0));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    let err = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&path)
        .unwrap_err();
    assert!(matches!(err, ExtractError::DecodeFailed { .. }));
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn debug_frames_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "scan.png", 6, 6);
    let frames = dir.path().join("frames");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(0));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .debug_frames_dir(&frames)
        .build()
        .unwrap();

    extractor(config, &ocr, &raster, &tables).extract(&png).unwrap();

    let saved = image::open(frames.join("frame-1.png")).unwrap();
    assert_eq!((saved.width(), saved.height()), (12, 12));
}

// ── Classification ───────────────────────────────────────────────────────────

#[test]
fn unsupported_type_returns_message_without_work() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "results.docx");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract(&path)
        .unwrap();

    assert_eq!(out.text, UNSUPPORTED_FILE_MESSAGE);
    assert_eq!(out.strategy, ExtractionStrategy::Unsupported);
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    assert_eq!(tables.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_file_is_a_classification_error() {
    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![])));

    let err = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract("/no/such/report.pdf")
        .unwrap_err();
    assert!(err.is_classification());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl ExtractionProgressCallback for EventLog {
    fn on_extraction_start(&self, kind: InputKind) {
        self.0.lock().unwrap().push(format!("start {kind}"));
    }
    fn on_strategy_selected(&self, strategy: ExtractionStrategy) {
        self.0.lock().unwrap().push(format!("strategy {strategy}"));
    }
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        self.0
            .lock()
            .unwrap()
            .push(format!("page {page_num}/{total_pages}"));
    }
    fn on_page_complete(&self, page_num: usize, _total_pages: usize, text_len: usize) {
        self.0
            .lock()
            .unwrap()
            .push(format!("done {page_num} ({text_len})"));
    }
    fn on_extraction_complete(&self, strategy: ExtractionStrategy, text_len: usize) {
        self.0
            .lock()
            .unwrap()
            .push(format!("complete {strategy} {text_len}"));
    }
    fn on_extraction_failed(&self, error: &ExtractError) {
        let what = if error.is_classification() { "input" } else { "pipeline" };
        self.0.lock().unwrap().push(format!("failed {what}"));
    }
}

#[test]
fn progress_events_follow_the_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let log = Arc::new(EventLog::default());
    let ocr = Arc::new(StubOcr::returning("abc"));
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Err(TableError::Page {
        page: 1,
        detail: "bad".into(),
    })));
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone())
        .build()
        .unwrap();

    extractor(config, &ocr, &raster, &tables).extract(&pdf).unwrap();

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "start pdf",
            "strategy raster OCR",
            "page 1/2",
            "done 1 (3)",
            "page 2/2",
            "done 2 (3)",
            "complete raster OCR 8",
        ]
    );
}

#[test]
fn failed_extraction_ends_with_a_failure_event() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "scan.pdf");

    let log = Arc::new(EventLog::default());
    let ocr = Arc::new(StubOcr {
        fail_on_page: Some(2),
        ..StubOcr::returning("abc")
    });
    let raster = Arc::new(StubRasterizer::with_pages(2));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone())
        .build()
        .unwrap();

    extractor(config, &ocr, &raster, &tables)
        .extract(&pdf)
        .unwrap_err();

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "start pdf",
            "strategy raster OCR",
            "page 1/2",
            "done 1 (3)",
            "page 2/2",
            "failed pipeline",
        ]
    );
}

#[test]
fn missing_input_reports_failure_before_any_other_event() {
    let log = Arc::new(EventLog::default());
    let ocr = Arc::new(StubOcr::returning("abc"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![])));
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone())
        .build()
        .unwrap();

    extractor(config, &ocr, &raster, &tables)
        .extract("/no/such/report.pdf")
        .unwrap_err();

    assert_eq!(*log.0.lock().unwrap(), vec!["failed input"]);
}

// ── Async and file entry points ──────────────────────────────────────────────

#[tokio::test]
async fn async_extraction_runs_on_the_blocking_pool() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = touch(dir.path(), "report.pdf");

    let ocr = Arc::new(StubOcr::returning("x"));
    let raster = Arc::new(StubRasterizer::with_pages(1));
    let tables = Arc::new(StubTables::new(Ok(vec![table(1, &[&["Na", "140", "mmol/L"]])])));

    let out = extractor(ExtractionConfig::default(), &ocr, &raster, &tables)
        .extract_async(&pdf)
        .await
        .unwrap();
    assert_eq!(out.text, "--- Table 1 ---\nNa 140 mmol/L\n");
}

#[tokio::test]
async fn extract_to_file_writes_the_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "notes.txt");
    let out_path = dir.path().join("out").join("notes.out.txt");

    let stats = extract_to_file(&input, &out_path, &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&out_path).unwrap(),
        UNSUPPORTED_FILE_MESSAGE
    );
    assert_eq!(stats.ocr_pages, 0);
}

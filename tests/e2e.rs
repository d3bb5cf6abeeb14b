//! End-to-end tests against a real tesseract install and pdfium library.
//!
//! These use fixture documents in `./test_cases/` and are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested. The analysis test additionally needs an LLM API key.
//!
//! Run with:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture
//!
//! Fixtures:
//!   test_cases/cbc_photo.png        phone photo of a printed blood count
//!   test_cases/lipid_panel.pdf      born-digital report with an aligned results table
//!   test_cases/scanned_report.pdf   two-page scan with no text layer

use medreport_ocr::{
    analyze_report, extract_text, extract_text_sync, AnalysisConfig, AnalysisKind, ExtractError,
    ExtractionConfig, ExtractionConfigBuilder, ExtractionStrategy, PageSelection,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* the fixture at `path` is missing.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — fixture not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Engine path from the environment, so CI images can point at a custom build.
fn config() -> ExtractionConfig {
    let mut builder = ExtractionConfig::builder();
    if let Ok(t) = std::env::var("MEDOCR_TESSERACT") {
        builder = builder.tesseract_path(t);
    }
    if let Ok(p) = std::env::var("MEDOCR_PDFIUM_LIB") {
        builder = builder.pdfium_library_path(p);
    }
    builder.build().expect("valid config")
}

/// Text that went through the lab-value rules has no commas, capital O or lowercase l.
fn assert_lab_normalised(text: &str, context: &str) {
    assert!(!text.trim().is_empty(), "[{context}] text is empty");
    for c in [',', 'O', 'l'] {
        assert!(
            !text.contains(c),
            "[{context}] normalised text still contains {c:?}"
        );
    }
    println!("[{context}] ✓  {} chars", text.len());
}

// ── Images ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_image_ocr_cbc_photo() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("cbc_photo.png"));

    let out = extract_text(&path, &config())
        .await
        .expect("extraction should succeed");

    assert_eq!(out.strategy, ExtractionStrategy::ImageOcr);
    assert_eq!(out.pages.len(), 1);
    assert_lab_normalised(&out.text, "cbc_photo");
    std::fs::write(output_dir().join("cbc_photo.txt"), &out.text).ok();
}

#[test]
fn test_image_ocr_sync_matches_async_settings() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("cbc_photo.png"));

    let a = extract_text_sync(&path, &config()).expect("first run");
    let b = extract_text_sync(&path, &config()).expect("second run");
    assert_eq!(a.text, b.text, "OCR of the same frame must be deterministic");
}

#[test]
fn test_missing_engine_is_reported() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("cbc_photo.png"));

    let config = ExtractionConfigBuilder::from_config(config())
        .tesseract_path("/definitely/not/tesseract")
        .build()
        .unwrap();
    let err = extract_text_sync(&path, &config).unwrap_err();
    assert!(
        matches!(err, ExtractError::OcrEngineUnavailable { .. }),
        "got {err:?}"
    );
}

// ── PDFs ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pdf_with_text_layer_uses_tables() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("lipid_panel.pdf"));

    let out = extract_text(&path, &config())
        .await
        .expect("extraction should succeed");

    assert_eq!(out.strategy, ExtractionStrategy::Tables);
    assert!(out.text.starts_with("--- Table 1 ---\n"), "got {:?}", out.text);
    assert!(out.stats.tables_found >= 1);
    assert_eq!(out.stats.ocr_pages, 0, "OCR must not run when tables are found");
    std::fs::write(output_dir().join("lipid_panel.txt"), &out.text).ok();
}

#[tokio::test]
async fn test_pdf_tables_disabled_forces_ocr() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("lipid_panel.pdf"));

    let config = ExtractionConfigBuilder::from_config(config())
        .table_extraction(false)
        .dpi(200)
        .build()
        .unwrap();
    let out = extract_text(&path, &config).await.expect("extraction");

    assert_eq!(out.strategy, ExtractionStrategy::RasterOcr);
    assert!(!out.text.contains("--- Table"));
}

#[tokio::test]
async fn test_scanned_pdf_falls_back_to_ocr() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned_report.pdf"));

    let out = extract_text(&path, &config())
        .await
        .expect("extraction should succeed");

    assert_eq!(out.strategy, ExtractionStrategy::RasterOcr);
    assert_eq!(out.stats.total_pages, 2);
    let nums: Vec<usize> = out.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(nums, vec![1, 2], "pages must stay in order");
    assert_lab_normalised(&out.text, "scanned_report");
    std::fs::write(output_dir().join("scanned_report.txt"), &out.text).ok();
}

#[tokio::test]
async fn test_scanned_pdf_single_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned_report.pdf"));

    let config = ExtractionConfigBuilder::from_config(config())
        .pages(PageSelection::Single(2))
        .build()
        .unwrap();
    let out = extract_text(&path, &config).await.expect("extraction");

    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].page_num, 2);
}

// ── Analysis (needs LLM API) ─────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_cbc_photo() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("cbc_photo.png"));
    if std::env::var("GEMINI_API_KEY").is_err() && std::env::var("MEDOCR_LLM_PROVIDER").is_err() {
        println!("SKIP — no LLM provider configured");
        return;
    }

    let analysis = AnalysisConfig::builder()
        .kind(AnalysisKind::QuickSummary)
        .max_retries(2)
        .build()
        .unwrap();
    let report = analyze_report(&path, &config(), &analysis)
        .await
        .expect("analysis should succeed");

    let text = report.analysis.as_deref().unwrap_or("");
    assert!(!text.trim().is_empty(), "analysis is empty");
    assert!(report.specialty.is_some());
    assert!(report.to_report_string().starts_with("EXTRACTED TEXT:\n"));
    std::fs::write(output_dir().join("cbc_photo_report.txt"), report.to_report_string()).ok();
}

//! Structured table extraction from the PDF text layer.
//!
//! [`PdfiumTableExtractor`] reads positioned characters from each page and
//! recovers tables from whitespace alone, with no ruling lines required:
//!
//! 1. Characters are grouped into lines by their vertical centre.
//! 2. Each line is split into cells wherever the horizontal gap between two
//!    characters is wide compared to the line height (a column gutter rather
//!    than a word space).
//! 3. A table is a maximal run of consecutive lines that each have at least
//!    two cells, provided the run has at least `min_rows` lines.
//!
//! Scanned PDFs have no text layer and therefore yield no tables, which sends
//! the selector to the OCR fallback.

use crate::error::TableError;
use crate::pipeline::render::bind_pdfium;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One table found on a PDF page: ordered rows of ordered cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    /// 1-indexed page the table was found on.
    pub page_num: usize,
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// A table is empty when it has no cell with visible text.
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.trim().is_empty())
    }
}

/// Extract tables from the given 0-indexed pages of a PDF.
pub trait TableExtractor: Send + Sync {
    fn extract_tables(
        &self,
        pdf_path: &Path,
        page_indices: &[usize],
    ) -> Result<Vec<ExtractedTable>, TableError>;
}

/// What the table stage produced, as seen by the strategy selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// At least one non-empty table, in page order.
    Found(Vec<ExtractedTable>),
    /// The extractor ran but found nothing usable.
    Empty,
    /// The extractor failed; the error is logged and OCR takes over.
    Failed(TableError),
}

impl TableOutcome {
    /// Fold an extractor result into an outcome, dropping empty tables.
    pub fn from_result(result: Result<Vec<ExtractedTable>, TableError>) -> Self {
        match result {
            Ok(tables) => {
                let tables: Vec<_> = tables.into_iter().filter(|t| !t.is_empty()).collect();
                if tables.is_empty() {
                    TableOutcome::Empty
                } else {
                    TableOutcome::Found(tables)
                }
            }
            Err(e) => TableOutcome::Failed(e),
        }
    }
}

/// Render tables as text blocks.
///
/// Each block starts with `--- Table {i} ---` (1-based, sequential across the
/// document), followed by one line per row with cells separated by a single
/// space. Cell text is kept verbatim.
pub fn render_tables(tables: &[ExtractedTable]) -> String {
    let mut out = String::new();
    for (i, table) in tables.iter().enumerate() {
        out.push_str(&format!("--- Table {} ---\n", i + 1));
        for row in &table.rows {
            out.push_str(&row.join(" "));
            out.push('\n');
        }
    }
    out
}

// ── pdfium-backed extractor ──────────────────────────────────────────────────

/// [`TableExtractor`] that clusters the characters of the PDF text layer.
#[derive(Debug, Clone)]
pub struct PdfiumTableExtractor {
    library_path: Option<PathBuf>,
    min_rows: usize,
}

impl PdfiumTableExtractor {
    pub fn new(library_path: Option<PathBuf>, min_rows: usize) -> Self {
        Self {
            library_path,
            min_rows: min_rows.max(1),
        }
    }
}

impl TableExtractor for PdfiumTableExtractor {
    fn extract_tables(
        &self,
        pdf_path: &Path,
        page_indices: &[usize],
    ) -> Result<Vec<ExtractedTable>, TableError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())
            .map_err(|e| TableError::Open(e.to_string()))?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| TableError::Open(format!("{e:?}")))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let mut tables = Vec::new();

        for &idx in page_indices {
            if idx >= total_pages {
                warn!("Skipping page {} for tables (total={})", idx + 1, total_pages);
                continue;
            }
            let page_err = |e: PdfiumError| TableError::Page {
                page: idx + 1,
                detail: format!("{e:?}"),
            };

            let page = pages.get(idx as u16).map_err(page_err)?;
            let text = page.text().map_err(page_err)?;

            let glyphs: Vec<Glyph> = text
                .chars()
                .iter()
                .filter_map(|c| {
                    let ch = c.unicode_string()?.chars().next()?;
                    let b = c.loose_bounds().ok()?;
                    Some(Glyph {
                        ch,
                        left: b.left().value,
                        right: b.right().value,
                        bottom: b.bottom().value,
                        top: b.top().value,
                    })
                })
                .collect();

            let found = detect_tables(&glyphs, self.min_rows);
            debug!(
                "Page {}: {} glyphs, {} table(s)",
                idx + 1,
                glyphs.len(),
                found.len()
            );
            tables.extend(found.into_iter().map(|rows| ExtractedTable {
                page_num: idx + 1,
                rows,
            }));
        }

        Ok(tables)
    }
}

// ── Layout clustering ────────────────────────────────────────────────────────

/// A positioned character in PDF user space (y grows upwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Glyph {
    pub ch: char,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Glyph {
    fn centre_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn height(&self) -> f32 {
        (self.top - self.bottom).abs()
    }
}

/// Gap, relative to line height, that separates two words within a cell.
const WORD_GAP: f32 = 0.15;
/// Gap, relative to line height, that separates two cells.
const CELL_GAP: f32 = 0.9;

/// Group glyphs into text lines, top of the page first.
pub(crate) fn group_lines(glyphs: &[Glyph]) -> Vec<Vec<Glyph>> {
    let mut visible: Vec<Glyph> = glyphs
        .iter()
        .copied()
        .filter(|g| !g.ch.is_whitespace() && !g.ch.is_control() && g.height() > 0.0)
        .collect();
    visible.sort_by(|a, b| b.centre_y().total_cmp(&a.centre_y()));

    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    for g in visible {
        match lines.last_mut() {
            Some(line) if same_line(line, &g) => line.push(g),
            _ => lines.push(vec![g]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.left.total_cmp(&b.left));
    }
    lines
}

fn same_line(line: &[Glyph], g: &Glyph) -> bool {
    let n = line.len() as f32;
    let centre = line.iter().map(Glyph::centre_y).sum::<f32>() / n;
    let height = line.iter().map(Glyph::height).fold(g.height(), f32::max);
    (centre - g.centre_y()).abs() <= height / 2.0
}

/// Split one line (sorted left to right) into trimmed cell strings.
pub(crate) fn split_cells(line: &[Glyph]) -> Vec<String> {
    let Some(first) = line.first() else {
        return Vec::new();
    };
    let height = line.iter().map(Glyph::height).fold(0.0, f32::max);

    let mut cells = Vec::new();
    let mut cell = String::new();
    cell.push(first.ch);
    for pair in line.windows(2) {
        let gap = pair[1].left - pair[0].right;
        if gap > CELL_GAP * height {
            cells.push(cell.trim().to_string());
            cell = String::new();
        } else if gap > WORD_GAP * height {
            cell.push(' ');
        }
        cell.push(pair[1].ch);
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Find tables on one page: maximal runs of multi-cell lines.
pub(crate) fn detect_tables(glyphs: &[Glyph], min_rows: usize) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    for line in group_lines(glyphs) {
        let cells = split_cells(&line);
        if cells.len() >= 2 {
            run.push(cells);
        } else {
            if run.len() >= min_rows {
                tables.push(std::mem::take(&mut run));
            }
            run.clear();
        }
    }
    if run.len() >= min_rows {
        tables.push(run);
    }
    tables
}

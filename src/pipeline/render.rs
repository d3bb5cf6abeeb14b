//! PDF rasterisation: render selected pages to `DynamicImage` via pdfium.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 400 DPI would produce a
//! 13,000 × 18,700 px frame. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded while a normal A4
//! report still renders at the full requested DPI.
//!
//! All functions here are blocking. The async entry points move the whole
//! extraction onto a `spawn_blocking` thread, so nothing in this module is
//! ever called from a Tokio worker.

use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Render PDF pages to raster frames.
pub trait PageRasterizer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, pdf_path: &Path) -> Result<usize, ExtractError>;

    /// Render the given 0-indexed pages, in the order given.
    ///
    /// Returns `(page_index_0based, image)` pairs. Out-of-range indices are
    /// skipped with a warning.
    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        max_pixels: u32,
        page_indices: &[usize],
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractError>;
}

/// Bind to a pdfium library.
///
/// `library_path` may name the shared library itself or the directory that
/// holds it. Without one, the working directory is tried first, then the
/// system library search path.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ExtractError> {
    let bindings = match library_path {
        Some(p) if p.is_file() => Pdfium::bind_to_library(p),
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

pub(crate) fn open_error(path: &Path, e: PdfiumError) -> ExtractError {
    ExtractError::CorruptPdf {
        path: path.to_path_buf(),
        detail: format!("{e:?}"),
    }
}

/// [`PageRasterizer`] backed by pdfium-render.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<usize, ExtractError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| open_error(pdf_path, e))?;
        Ok(document.pages().len() as usize)
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        max_pixels: u32,
        page_indices: &[usize],
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| open_error(pdf_path, e))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded for rendering: {} pages at {} DPI", total_pages, dpi);

        // PDF user space is 72 points per inch.
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        let mut results = Vec::with_capacity(page_indices.len());

        for &idx in page_indices {
            if idx >= total_pages {
                warn!(
                    "Skipping page {} (out of range, total={})",
                    idx + 1,
                    total_pages
                );
                continue;
            }

            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push((idx, image));
        }

        Ok(results)
    }
}

//! Frame preprocessing: make a grayscale frame easier for the OCR engine.
//!
//! Steps run in a fixed order, and the order is part of the contract:
//!
//! 1. Linear contrast: `clamp(round(alpha * v + beta), 0, 255)`
//! 2. 3×3 Gaussian blur (`[1 2 1] ⊗ [1 2 1] / 16`, replicated borders)
//! 3. Optional cubic upscale to `resize_percent` of the original size
//!
//! Blurring after resizing would smear the interpolated pixels instead of
//! the scan noise, so the blur always runs at source resolution.
//!
//! The contrast table and the blur kernel are fixed per configuration, so
//! identical input and options give byte-identical output.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use image::imageops::FilterType;
use image::{GrayImage, ImageReader, Luma};
use imageproc::filter::filter3x3;
use std::path::Path;
use tracing::debug;

/// Knobs for [`preprocess`], usually taken from an [`ExtractionConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessOptions {
    pub alpha: f32,
    pub beta: f32,
    pub denoise: bool,
    pub resize_percent: Option<u32>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for PreprocessOptions {
    fn from(c: &ExtractionConfig) -> Self {
        Self {
            alpha: c.contrast_alpha,
            beta: c.contrast_beta,
            denoise: c.denoise,
            resize_percent: c.resize_percent,
        }
    }
}

/// Decode an image file into a grayscale frame.
///
/// The format is sniffed from the content, so a mislabelled extension still
/// decodes; a corrupt file is a fatal [`ExtractError::DecodeFailed`].
pub fn load_frame(path: &Path) -> Result<GrayImage, ExtractError> {
    let decode_err = |detail: String| ExtractError::DecodeFailed {
        path: path.to_path_buf(),
        detail,
    };

    let img = ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))?;

    debug!(
        "Decoded {} → {}x{} px",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_luma8())
}

/// Run the full preprocessing sequence on a grayscale frame.
pub fn preprocess(frame: &GrayImage, opts: &PreprocessOptions) -> GrayImage {
    let mut out = adjust_contrast(frame, opts.alpha, opts.beta);
    if opts.denoise {
        out = gaussian_blur_3x3(&out);
    }
    if let Some(pct) = opts.resize_percent {
        out = upscale(&out, pct);
    }
    debug!(
        "Preprocessed {}x{} → {}x{} (alpha={}, beta={}, denoise={}, resize={:?})",
        frame.width(),
        frame.height(),
        out.width(),
        out.height(),
        opts.alpha,
        opts.beta,
        opts.denoise,
        opts.resize_percent
    );
    out
}

// ── Step 1: contrast ─────────────────────────────────────────────────────

pub fn adjust_contrast(frame: &GrayImage, alpha: f32, beta: f32) -> GrayImage {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = (alpha * v as f32 + beta).round().clamp(0.0, 255.0) as u8;
    }
    let mut out = frame.clone();
    for px in out.pixels_mut() {
        px.0[0] = lut[px.0[0] as usize];
    }
    out
}

// ── Step 2: blur ─────────────────────────────────────────────────────────

/// `[1 2 1] ⊗ [1 2 1] / 16`; every weight is exact in `f32`.
#[rustfmt::skip]
const GAUSSIAN_3X3: [f32; 9] = [
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
    2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0,
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
];

/// 3×3 Gaussian blur with edge pixels replicated past the border.
pub fn gaussian_blur_3x3(frame: &GrayImage) -> GrayImage {
    if frame.width() == 0 || frame.height() == 0 {
        return frame.clone();
    }
    filter3x3::<Luma<u8>, f32, u8>(frame, &GAUSSIAN_3X3)
}

// ── Step 3: resize ───────────────────────────────────────────────────────

pub fn upscale(frame: &GrayImage, percent: u32) -> GrayImage {
    let (w, h) = frame.dimensions();
    let nw = ((w as u64 * percent as u64) / 100).max(1) as u32;
    let nh = ((h as u64 * percent as u64) / 100).max(1) as u32;
    if (nw, nh) == (w, h) || w == 0 || h == 0 {
        return frame.clone();
    }
    image::imageops::resize(frame, nw, nh, FilterType::CatmullRom)
}

//! OCR engine seam and the tesseract command-line adapter.
//!
//! The pipeline only ever sees [`OcrEngine`]; tests substitute a stub that
//! returns canned text, so no engine has to be installed to exercise the
//! extraction logic.

use crate::config::OcrSettings;
use crate::error::ExtractError;
use image::GrayImage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Recognise the text in one preprocessed grayscale frame.
pub trait OcrEngine: Send + Sync {
    /// `page_num` is 1-indexed and only used for error reporting.
    fn recognize(
        &self,
        frame: &GrayImage,
        settings: &OcrSettings,
        page_num: usize,
    ) -> Result<String, ExtractError>;
}

/// Runs the `tesseract` binary once per frame.
///
/// The frame is written to a temporary PNG in `scratch_dir` (or the system
/// temp directory) which is removed when the call returns, on success or
/// failure.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scratch_dir: None,
        }
    }

    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn write_frame(&self, frame: &GrayImage) -> Result<tempfile::NamedTempFile, ExtractError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("frame-").suffix(".png");
        let file = match self.scratch_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractError::ScratchFile {
            detail: e.to_string(),
        })?;

        frame
            .save_with_format(file.path(), image::ImageFormat::Png)
            .map_err(|e| ExtractError::ScratchFile {
                detail: format!("{}: {e}", file.path().display()),
            })?;
        Ok(file)
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        frame: &GrayImage,
        settings: &OcrSettings,
        page_num: usize,
    ) -> Result<String, ExtractError> {
        let png = self.write_frame(frame)?;

        debug!(
            "Running {} on page {} ({})",
            self.binary.display(),
            page_num,
            settings.config_string()
        );

        let output = Command::new(&self.binary)
            .arg(png.path())
            .arg("stdout")
            .args(settings.args())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ExtractError::OcrEngineUnavailable {
                        binary: self.binary.clone(),
                        detail: e.to_string(),
                    }
                }
                _ => ExtractError::OcrEngineFailed {
                    page: page_num,
                    detail: e.to_string(),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::OcrEngineFailed {
                page: page_num,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//! Input classification: decide whether a file is a PDF, an image, or neither.
//!
//! The decision is made from the file extension, not the content. A missing
//! or unreadable file is an error; an unknown extension is not, it simply
//! classifies as [`InputKind::Unsupported`].

use crate::error::ExtractError;
use crate::output::{InputDocument, InputKind};
use std::path::Path;
use tracing::debug;

/// Extensions accepted as raster images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Classify a file by its extension after checking it can be opened.
pub fn classify(path: impl AsRef<Path>) -> Result<InputDocument, ExtractError> {
    let path = path.as_ref().to_path_buf();
    ensure_readable(&path)?;

    let kind = kind_for_path(&path);
    debug!("Classified {} as {}", path.display(), kind);
    Ok(InputDocument::new(path, kind))
}

/// Extension lookup only; does not touch the filesystem.
pub fn kind_for_path(path: &Path) -> InputKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return InputKind::Unsupported;
    };
    let ext = ext.to_ascii_lowercase();
    if ext == "pdf" {
        InputKind::Pdf
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        InputKind::Image
    } else {
        InputKind::Unsupported
    }
}

fn ensure_readable(path: &Path) -> Result<(), ExtractError> {
    // An unsearchable parent directory is a permission error, not a missing file.
    let meta = std::fs::metadata(path).map_err(|e| access_error(path, &e))?;
    if meta.is_dir() {
        return Err(ExtractError::FileNotFound { path: path.to_path_buf() });
    }

    std::fs::File::open(path)
        .map(|_| ())
        .map_err(|e| access_error(path, &e))
}

fn access_error(path: &Path, e: &std::io::Error) -> ExtractError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            ExtractError::PermissionDenied { path: path.to_path_buf() }
        }
        _ => ExtractError::FileNotFound { path: path.to_path_buf() },
    }
}

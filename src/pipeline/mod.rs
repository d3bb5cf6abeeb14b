//! Pipeline stages for document text extraction.
//!
//! Each submodule implements one step. The external collaborators (OCR
//! engine, PDF rasteriser, table extractor) sit behind traits so the
//! strategy selector in [`crate::extract`] can be driven by stubs.
//!
//! ## Data Flow
//!
//! ```text
//! sniff ──▶ tables ──(none/failed)──▶ render ──▶ preprocess ──▶ ocr ──▶ normalize
//! (ext)     (pdfium text)             (pdfium)   (image)        (tesseract)
//! ```
//!
//! 1. [`sniff`]      — classify the input by extension
//! 2. [`tables`]     — whitespace-aligned tables from the PDF text layer
//! 3. [`render`]     — rasterise selected pages at the configured DPI
//! 4. [`preprocess`] — contrast, blur and upscale a grayscale frame
//! 5. [`ocr`]        — recognise a frame with the tesseract CLI
//! 6. [`normalize`]  — fix systematic character confusions
//!
//! [`llm`] is not part of extraction; [`crate::analyze`] uses it afterwards.

pub mod llm;
pub mod normalize;
pub mod ocr;
pub mod preprocess;
pub mod render;
pub mod sniff;
pub mod tables;

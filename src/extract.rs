//! PDF-to-text extraction with a repair pass.
//!
//! Primary extraction goes through `pdf-extract`. If that fails, the bytes
//! are reloaded with `lopdf`'s tolerant parser, re-serialized, and extracted
//! once more before the document is declared unparseable — the same
//! parse-then-repair shape commonly used for slightly corrupted uploads.

use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// Magic bytes every PDF starts with.
const PDF_HEADER: &[u8] = b"%PDF-";

/// Extract the text content of a PDF held in memory.
///
/// # Errors
///
/// Returns [`RagError::Extraction`] if the input is not a PDF, or if both
/// the primary parse and the repair pass fail (severely corrupted or
/// password-protected files).
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    if !bytes.starts_with(PDF_HEADER) {
        return Err(RagError::Extraction(
            "uploaded content is not a PDF (missing %PDF header)".to_string(),
        ));
    }

    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => {
            debug!(text_len = text.len(), "extracted text from PDF");
            Ok(text)
        }
        Err(first_error) => {
            warn!(error = %first_error, "primary PDF parse failed, attempting repair");
            repair_and_extract(bytes, &first_error.to_string())
        }
    }
}

/// Reload with the tolerant parser, re-save, and extract again.
fn repair_and_extract(bytes: &[u8], first_error: &str) -> Result<String> {
    let mut document = lopdf::Document::load_mem(bytes).map_err(|e| {
        RagError::Extraction(format!(
            "unable to parse PDF: {first_error}; repair failed: {e}. \
             The PDF may be severely corrupted or password-protected."
        ))
    })?;

    let mut repaired = Vec::new();
    document.save_to(&mut repaired).map_err(|e| {
        RagError::Extraction(format!(
            "unable to parse PDF: {first_error}; could not re-save repaired document: {e}"
        ))
    })?;

    let text = pdf_extract::extract_text_from_mem(&repaired).map_err(|e| {
        RagError::Extraction(format!(
            "unable to parse PDF: {first_error}; repaired parse also failed: {e}. \
             The PDF may be severely corrupted or password-protected."
        ))
    })?;

    debug!(text_len = text.len(), "extracted text from repaired PDF");
    Ok(text)
}

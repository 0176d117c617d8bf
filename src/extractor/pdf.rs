// file: src/extractor/pdf.rs
// description: page-by-page text extraction from PDF resumes
// reference: https://docs.rs/lopdf

use crate::error::{PipelineError, Result};
use lopdf::Document as PdfDocument;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let start = Instant::now();
    let file = path.display().to_string();

    let pdf = PdfDocument::load(path).map_err(|e| PipelineError::extraction(&file, e))?;

    let mut text = String::new();

    // get_pages is keyed by page number, so iteration follows document order
    for page_number in pdf.get_pages().into_keys() {
        let page_start = Instant::now();

        match pdf.extract_text(&[page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                debug!(
                    "Page {}: {} chars in {:.1}ms",
                    page_number,
                    page_text.chars().count(),
                    page_start.elapsed().as_secs_f64() * 1000.0
                );
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => debug!("Page {} has no extractable text", page_number),
            Err(e) => warn!("Failed to extract page {} of {}: {}", page_number, file, e),
        }
    }

    debug!(
        "PDF extraction for {}: {:.3}s total",
        file,
        start.elapsed().as_secs_f64()
    );

    Ok(text.trim().to_string())
}

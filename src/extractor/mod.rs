// file: src/extractor/mod.rs
// description: resume text extraction module exports and format dispatch
// reference: internal module structure

pub mod cleaner;
pub mod docx;
pub mod pdf;

pub use cleaner::clean_text;
pub use docx::extract_docx_text;
pub use pdf::extract_pdf_text;

use crate::error::Result;
use crate::utils::Validator;
use std::path::Path;

/// Resume formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Extract the plain text of a resume file, choosing the parser by extension.
pub fn extract_text(path: &Path) -> Result<String> {
    match Validator::validate_resume_extension(path)? {
        DocumentFormat::Pdf => extract_pdf_text(path),
        DocumentFormat::Docx => extract_docx_text(path),
    }
}

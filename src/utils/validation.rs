// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use crate::extractor::DocumentFormat;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_resume_extension(path: &Path) -> Result<DocumentFormat> {
        DocumentFormat::from_path(path).ok_or_else(|| {
            PipelineError::UnsupportedFormat(format!(
                "{} (expected .pdf or .docx)",
                path.display()
            ))
        })
    }

    pub fn validate_content_not_empty(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PipelineError::Validation("Content is empty".to_string()));
        }
        Ok(())
    }

    /// Content must be strictly longer than `min_chars` characters.
    pub fn validate_min_length(content: &str, min_chars: usize) -> Result<()> {
        let count = content.trim().chars().count();
        if count <= min_chars {
            return Err(PipelineError::Validation(format!(
                "Content too short ({} chars, need more than {})",
                count, min_chars
            )));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_top_k(k: usize) -> Result<()> {
        if k == 0 {
            return Err(PipelineError::Validation(
                "Result count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Keep the first `max_chars` characters, appending `...` when cut.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
            None => text.to_string(),
        }
    }
}

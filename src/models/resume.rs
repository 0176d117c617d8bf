// file: src/models/resume.rs
// description: resume record holding raw and cleaned text
// reference: internal data structures

use crate::extractor::clean_text;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub filename: String,
    pub raw_text: String,
    pub cleaned_text: String,
}

impl Resume {
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let cleaned_text = clean_text(&raw_text);

        Self {
            filename: filename.into(),
            raw_text,
            cleaned_text,
        }
    }

    /// Length of the cleaned text in characters.
    pub fn char_count(&self) -> usize {
        self.cleaned_text.chars().count()
    }
}

// file: src/extractor/cleaner.rs
// description: whitespace normalization for extracted resume text
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;
use std::time::{Duration, Instant};
use tracing::debug;

lazy_static! {
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("WHITESPACE_RUN regex is valid");
}

/// Trim the text and collapse every whitespace run into a single space.
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let start = Instant::now();
    let cleaned = WHITESPACE_RUN.replace_all(trimmed, " ").into_owned();

    let elapsed = start.elapsed();
    if elapsed > Duration::from_millis(1) {
        debug!("Text cleaning: {:.1}ms", elapsed.as_secs_f64() * 1000.0);
    }

    cleaned
}

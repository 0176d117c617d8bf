// file: src/models/document.rs
// description: indexed document model built from a cleaned resume
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Resume filename the content came from
    pub source: String,
    /// Cleaned text truncated to the configured character budget
    pub content: String,
    /// Character length of the full cleaned text before truncation
    pub length: u64,
    pub content_hash: String,
    pub indexed_at: u64,
}

impl Document {
    pub fn new(source: String, text: &str, max_chars: usize) -> Self {
        let content: String = text.chars().take(max_chars).collect();
        let content_hash = Self::compute_hash(&source, &content);
        let length = text.chars().count() as u64;
        let indexed_at = chrono::Utc::now().timestamp().max(0) as u64;

        Self {
            source,
            content,
            length,
            content_hash,
            indexed_at,
        }
    }

    fn compute_hash(source: &str, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn is_truncated(&self) -> bool {
        self.content.chars().count() as u64 != self.length
    }
}

// file: src/models/search_result.rs
// description: Search result model with rank and similarity scores
// reference: Used for vector similarity search results

use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based position in the result list
    pub rank: usize,

    /// Document ID (content hash)
    pub id: String,

    /// Resume filename
    pub source: String,

    /// Indexed (possibly truncated) resume text
    pub content: String,

    /// Character length of the full resume text
    pub length: u64,

    /// Cosine similarity (higher is more similar)
    pub score: f32,

    /// Cosine distance reported by the index (lower is more similar)
    pub distance: Option<f32>,
}

impl SearchResult {
    pub fn new(
        id: String,
        source: String,
        content: String,
        length: u64,
        distance: Option<f32>,
    ) -> Self {
        let score = distance.map(|d| 1.0 - d).unwrap_or(1.0);

        Self {
            rank: 0,
            id,
            source,
            content,
            length,
            score,
            distance,
        }
    }

    /// First `max_chars` characters of the content, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        Validator::truncate_text(&self.content, max_chars)
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        format!(
            "{}. {} (Score: {:.4})\n   Preview: {}\n",
            self.rank,
            self.source,
            self.score,
            self.preview(max_content_len)
        )
    }
}

/// Sort results by ascending distance and assign ranks starting at 1.
pub fn rank_results(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        a.distance
            .unwrap_or(f32::MAX)
            .total_cmp(&b.distance.unwrap_or(f32::MAX))
    });

    for (idx, result) in results.iter_mut().enumerate() {
        result.rank = idx + 1;
    }

    results
}

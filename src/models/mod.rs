// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod resume;
pub mod search_result;

pub use document::Document;
pub use resume::Resume;
pub use search_result::{SearchResult, rank_results};

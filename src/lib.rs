// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::{Config, DatabaseConfig, EmbeddingConfig, LlmConfig, ResumeConfig, SessionConfig};
pub use database::{EmbeddingClient, LanceDbClient, Retriever, SchemaManager, VectorStore};
pub use error::{PipelineError, Result};
pub use extractor::{DocumentFormat, clean_text, extract_text};
pub use ingest::{FileScanner, LoadedResumes, ResumeProcessor, ScanIssue, ScannedFile};
pub use llm::{OllamaClient, PromptTemplate, QueryEngine};
pub use models::{Document, Resume, SearchResult};
pub use pipeline::{LoadStats, MatchingSession, ProgressTracker, SessionStats};
pub use utils::{
    HealthCheck, HealthReport, HealthStatus, OperationTimer, PerformanceMetrics, Validator,
    format_time,
};

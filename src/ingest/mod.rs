// file: src/ingest/mod.rs
// description: resume discovery and loading module exports
// reference: internal module structure

pub mod processor;
pub mod scanner;

pub use processor::{LoadedResumes, ResumeProcessor};
pub use scanner::{FileScanner, ScanIssue, ScannedFile};

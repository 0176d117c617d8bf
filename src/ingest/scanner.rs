// file: src/ingest/scanner.rs
// description: resume directory listing with format and size filtering
// reference: https://docs.rs/walkdir

use crate::config::ResumeConfig;
use crate::error::{PipelineError, Result};
use crate::extractor::DocumentFormat;
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct FileScanner {
    max_file_size: u64,
}

/// Why a listed file cannot be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    /// Size in bytes, above the configured limit
    TooLarge(u64),
    /// Broken symlink, permission problem or failed stat
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub file_name: String,
    /// `None` when the extension is not a supported resume format
    pub format: Option<DocumentFormat>,
    pub issue: Option<ScanIssue>,
}

impl ScannedFile {
    fn new(path: PathBuf, issue: Option<ScanIssue>) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            format: DocumentFormat::from_path(&path),
            path,
            file_name,
            issue,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.format.is_some()
    }
}

impl FileScanner {
    pub fn new(config: &ResumeConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_mb * 1024 * 1024,
        }
    }

    /// List the regular files directly inside `root`, sorted by file name.
    /// Subdirectories are not descended into.
    ///
    /// Only an unreadable `root` is an error. Entries that cannot be read or
    /// exceed the size limit are returned with their [`ScanIssue`].
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        info!("Scanning directory: {}", root.display());
        Validator::validate_directory(root)?;

        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(PipelineError::Validation(format!(
                        "Cannot read directory {}: {}",
                        root.display(),
                        e
                    )));
                }
                Err(e) => {
                    let Some(path) = e.path().map(Path::to_path_buf) else {
                        warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                        continue;
                    };
                    warn!("Cannot read {}: {}", path.display(), e);
                    files.push(ScannedFile::new(
                        path,
                        Some(ScanIssue::Unreadable(e.to_string())),
                    ));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                debug!("Skipping non-file entry: {}", entry.path().display());
                continue;
            }

            let path = entry.path().to_path_buf();
            let issue = match entry.metadata() {
                Ok(metadata) if metadata.len() > self.max_file_size => {
                    Some(ScanIssue::TooLarge(metadata.len()))
                }
                Ok(_) => None,
                Err(e) => {
                    warn!("Cannot stat {}: {}", path.display(), e);
                    Some(ScanIssue::Unreadable(e.to_string()))
                }
            };

            files.push(ScannedFile::new(path, issue));
        }

        info!("Found {} files", files.len());
        Ok(files)
    }
}

// file: src/ingest/processor.rs
// description: loads resumes from the resume directory and prepares them for indexing
// reference: sequential extraction with per-file error isolation

use crate::config::ResumeConfig;
use crate::error::{PipelineError, Result};
use crate::extractor::extract_text;
use crate::ingest::scanner::{FileScanner, ScanIssue};
use crate::models::Resume;
use crate::pipeline::progress::{LoadStats, ProgressTracker};
use crate::utils::Validator;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct LoadedResumes {
    pub resumes: Vec<Resume>,
    pub stats: LoadStats,
}

pub struct ResumeProcessor {
    config: ResumeConfig,
    scanner: FileScanner,
    show_progress: bool,
}

impl ResumeProcessor {
    /// Creates the resume directory when it does not exist yet.
    pub fn new(config: ResumeConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir).map_err(|source| PipelineError::FileOperation {
            path: config.dir.clone(),
            source,
        })?;

        let scanner = FileScanner::new(&config);

        Ok(Self {
            config,
            scanner,
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn resume_dir(&self) -> &Path {
        &self.config.dir
    }

    /// Extract the text of every supported file in the resume directory.
    ///
    /// Unsupported and oversized files are skipped. Unreadable entries and
    /// files whose extraction fails or yields no text are counted as failures;
    /// none of them stops the run.
    pub fn load_resumes(&self) -> Result<LoadedResumes> {
        let files = self.scanner.scan_directory(&self.config.dir)?;

        if files.is_empty() {
            info!("No files found in {}", self.config.dir.display());
            return Ok(LoadedResumes::default());
        }

        let tracker = if self.show_progress {
            ProgressTracker::new(files.len())
        } else {
            ProgressTracker::hidden(files.len())
        };

        let mut resumes = Vec::new();

        for file in files {
            tracker.set_message(file.file_name.clone());

            match &file.issue {
                Some(ScanIssue::Unreadable(reason)) => {
                    error!("Cannot read {}: {}", file.file_name, reason);
                    tracker.inc_files_failed();
                    continue;
                }
                Some(ScanIssue::TooLarge(size)) => {
                    warn!(
                        "Skipping large file ({} MB): {}",
                        size / 1024 / 1024,
                        file.file_name
                    );
                    tracker.inc_files_skipped();
                    continue;
                }
                None => {}
            }

            if !file.is_supported() {
                warn!("Skipping unsupported file: {}", file.file_name);
                tracker.inc_files_skipped();
                continue;
            }

            let file_start = Instant::now();

            match extract_text(&file.path) {
                Ok(text) if Validator::validate_content_not_empty(&text).is_ok() => {
                    let chars = text.chars().count();
                    info!(
                        "Successfully processed: {} ({} chars) in {:.2}s",
                        file.file_name,
                        chars,
                        file_start.elapsed().as_secs_f64()
                    );
                    tracker.inc_files_processed(chars as u64);
                    resumes.push(Resume::new(file.file_name, text));
                }
                Ok(_) => {
                    warn!(
                        "No text extracted from: {} in {:.2}s",
                        file.file_name,
                        file_start.elapsed().as_secs_f64()
                    );
                    tracker.inc_files_failed();
                }
                Err(e) => {
                    error!(
                        "Failed to extract text from {} after {:.2}s: {}",
                        file.file_name,
                        file_start.elapsed().as_secs_f64(),
                        e
                    );
                    tracker.inc_files_failed();
                }
            }
        }

        tracker.finish();
        let stats = tracker.get_stats();

        info!(
            "Processing summary: {} files processed, {} failed, {} skipped, {} chars in {:.2}s",
            stats.files_processed,
            stats.files_failed,
            stats.files_skipped,
            stats.total_chars,
            stats.duration.as_secs_f64()
        );
        info!(
            "Processing speed: {:.1} files/second, {:.0} chars/second ({:.1}% success)",
            stats.files_per_second(),
            stats.chars_per_second(),
            stats.success_rate()
        );

        Ok(LoadedResumes { resumes, stats })
    }

    /// Keep resumes whose cleaned text is longer than the configured minimum.
    pub fn select_indexable(&self, resumes: Vec<Resume>) -> Vec<Resume> {
        resumes
            .into_iter()
            .filter(|resume| {
                match Validator::validate_min_length(&resume.cleaned_text, self.config.min_chars) {
                    Ok(()) => {
                        info!(
                            "Processed: {} ({} chars)",
                            resume.filename,
                            resume.char_count()
                        );
                        true
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", resume.filename, e);
                        false
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn processor_with_limit(dir: PathBuf, max_file_size_mb: u64) -> ResumeProcessor {
        ResumeProcessor::new(ResumeConfig {
            dir,
            min_chars: 50,
            max_file_size_mb,
        })
        .unwrap()
        .with_progress(false)
    }

    fn processor(dir: PathBuf) -> ResumeProcessor {
        processor_with_limit(dir, 10)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("data/resumes");

        let processor = processor(dir.clone());
        assert!(dir.is_dir());
        assert_eq!(processor.resume_dir(), dir.as_path());
    }

    #[test]
    fn test_load_resumes_skips_and_isolates_failures() {
        let temp = TempDir::new().unwrap();
        write_docx(
            &temp.path().join("alice.docx"),
            &["Alice Smith", "Backend engineer, Rust and PostgreSQL"],
        );
        fs::write(temp.path().join("broken.pdf"), "not a pdf").unwrap();
        fs::write(temp.path().join("cover.txt"), "plain text").unwrap();
        write_docx(&temp.path().join("blank.docx"), &[]);

        let loaded = processor(temp.path().to_path_buf()).load_resumes().unwrap();

        assert_eq!(loaded.resumes.len(), 1);
        assert_eq!(loaded.resumes[0].filename, "alice.docx");
        assert_eq!(
            loaded.resumes[0].cleaned_text,
            "Alice Smith Backend engineer, Rust and PostgreSQL"
        );
        assert_eq!(loaded.stats.files_processed, 1);
        assert_eq!(loaded.stats.files_failed, 2);
        assert_eq!(loaded.stats.files_skipped, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_does_not_stop_loading() {
        let temp = TempDir::new().unwrap();
        write_docx(
            &temp.path().join("alice.docx"),
            &["Alice Smith", "Backend engineer, Rust and PostgreSQL"],
        );
        std::os::unix::fs::symlink(temp.path().join("moved.pdf"), temp.path().join("old.pdf"))
            .unwrap();

        let loaded = processor(temp.path().to_path_buf()).load_resumes().unwrap();

        assert_eq!(loaded.resumes.len(), 1);
        assert_eq!(loaded.resumes[0].filename, "alice.docx");
        assert_eq!(loaded.stats.files_processed, 1);
        assert_eq!(loaded.stats.files_failed, 1);
    }

    #[test]
    fn test_oversized_files_count_as_skipped() {
        let temp = TempDir::new().unwrap();
        write_docx(
            &temp.path().join("alice.docx"),
            &["Alice Smith", "Backend engineer, Rust and PostgreSQL"],
        );
        fs::write(temp.path().join("scan.pdf"), vec![0u8; 2 * 1024 * 1024]).unwrap();

        let loaded = processor_with_limit(temp.path().to_path_buf(), 1)
            .load_resumes()
            .unwrap();

        assert_eq!(loaded.resumes.len(), 1);
        assert_eq!(loaded.stats.files_processed, 1);
        assert_eq!(loaded.stats.files_skipped, 1);
        assert_eq!(loaded.stats.files_failed, 0);
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let loaded = processor(temp.path().to_path_buf()).load_resumes().unwrap();
        assert!(loaded.resumes.is_empty());
        assert_eq!(loaded.stats.files_processed, 0);
    }

    #[test]
    fn test_select_indexable_applies_min_chars() {
        let temp = TempDir::new().unwrap();
        let processor = processor(temp.path().to_path_buf());

        let resumes = vec![
            Resume::new("short.pdf", "Too short"),
            Resume::new("long.pdf", "x ".repeat(40)),
        ];

        let kept = processor.select_indexable(resumes);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].filename, "long.pdf");
    }
}

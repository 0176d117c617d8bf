// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for resume loading and indexing
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub total_chars: u64,
    pub duration: Duration,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.files_processed as f64 / secs
    }

    pub fn chars_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_chars as f64 / secs
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.files_processed + self.files_failed;
        if total == 0 {
            return 0.0;
        }
        (self.files_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    files_processed: Arc<AtomicUsize>,
    files_failed: Arc<AtomicUsize>,
    files_skipped: Arc<AtomicUsize>,
    chars_extracted: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_files: usize) -> Self {
        Self::with_target(total_files, ProgressDrawTarget::stderr())
    }

    /// Tracker that counts without drawing, for tests and non-interactive runs.
    pub fn hidden(total_files: usize) -> Self {
        Self::with_target(total_files, ProgressDrawTarget::hidden())
    }

    fn with_target(total_files: usize, target: ProgressDrawTarget) -> Self {
        let multi_progress = MultiProgress::with_draw_target(target);

        let main_bar = multi_progress.add(ProgressBar::new(total_files as u64));
        main_bar.set_style(bar_style());

        let detail_bar = multi_progress.add(ProgressBar::new(0));
        detail_bar.set_style(message_style());

        Self {
            main_bar,
            detail_bar,
            files_processed: Arc::new(AtomicUsize::new(0)),
            files_failed: Arc::new(AtomicUsize::new(0)),
            files_skipped: Arc::new(AtomicUsize::new(0)),
            chars_extracted: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_files_processed(&self, chars: u64) {
        self.files_processed.fetch_add(1, Ordering::SeqCst);
        self.chars_extracted.fetch_add(chars, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_files_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_files_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Extraction complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> LoadStats {
        LoadStats {
            files_processed: self.files_processed.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            files_skipped: self.files_skipped.load(Ordering::SeqCst),
            total_chars: self.chars_extracted.load(Ordering::SeqCst),
            duration: self.start_time.elapsed(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Extracted: {} | Failed: {} | Skipped: {} | Chars: {}",
            self.files_processed.load(Ordering::SeqCst),
            self.files_failed.load(Ordering::SeqCst),
            self.files_skipped.load(Ordering::SeqCst),
            self.chars_extracted.load(Ordering::SeqCst)
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Bar used for counted work such as embedding batches.
pub fn counted_bar(total: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(bar_style());
    bar.set_message(message);
    bar
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

fn message_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

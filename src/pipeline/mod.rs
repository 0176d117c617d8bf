// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

pub mod input;
pub mod progress;
mod session;
mod stats;

pub use input::{UserInput, read_job_description, read_question};
pub use progress::{LoadStats, ProgressTracker};
pub use session::{MatchingSession, print_failure, print_matches, print_notice};
pub use stats::SessionStats;

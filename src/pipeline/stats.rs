// file: src/pipeline/stats.rs
// description: per-step timings and query counters for one matching session
// reference: performance summary printed at the end of a session

use crate::utils::format_time;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub resume_processing: Duration,
    pub vector_store_creation: Duration,
    pub ai_model_setup: Duration,
    pub job_matching: Duration,
    pub matches_found: usize,
    pub total_queries: usize,
    pub total_query_time: Duration,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&mut self, elapsed: Duration) {
        self.total_queries += 1;
        self.total_query_time += elapsed;
    }

    pub fn average_query_time(&self) -> Duration {
        match u32::try_from(self.total_queries) {
            Ok(count) if count > 0 => self.total_query_time / count,
            _ => Duration::ZERO,
        }
    }

    pub fn queries_per_second(&self) -> f64 {
        let secs = self.total_query_time.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_queries as f64 / secs
    }

    /// Resume processing, indexing and model setup combined.
    pub fn setup_time(&self) -> Duration {
        self.resume_processing + self.vector_store_creation + self.ai_model_setup
    }

    /// Setup time as a percentage of `total`.
    pub fn setup_share(&self, total: Duration) -> f64 {
        let total = total.as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        self.setup_time().as_secs_f64() / total * 100.0
    }

    pub fn format_summary(&self, total: Duration) -> String {
        let mut lines = vec![
            format!("Total Session Time: {}", format_time(total)),
            format!("Resume Processing: {}", format_time(self.resume_processing)),
            format!(
                "Vector Store Creation: {}",
                format_time(self.vector_store_creation)
            ),
            format!("AI Model Setup: {}", format_time(self.ai_model_setup)),
            format!("Job Matching: {}", format_time(self.job_matching)),
        ];

        if self.total_queries > 0 {
            lines.push(format!("Total Queries: {}", self.total_queries));
            lines.push(format!(
                "Total Query Time: {}",
                format_time(self.total_query_time)
            ));
            lines.push(format!(
                "Average Query Time: {}",
                format_time(self.average_query_time())
            ));
            lines.push(format!(
                "Queries per Second: {:.2}",
                self.queries_per_second()
            ));
        }

        lines.push(String::new());
        lines.push("EFFICIENCY ANALYSIS:".to_string());
        lines.push("-".repeat(30));
        lines.push(format!(
            "Setup Time: {} ({:.1}% of total)",
            format_time(self.setup_time()),
            self.setup_share(total)
        ));
        lines.push(format!(
            "Search Efficiency: {} for {} results",
            format_time(self.job_matching),
            self.matches_found
        ));

        if self.total_queries > 0 {
            lines.push(format!(
                "Q&A Efficiency: {} per query",
                format_time(self.average_query_time())
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats() -> SessionStats {
        SessionStats {
            resume_processing: Duration::from_millis(500),
            vector_store_creation: Duration::from_secs(2),
            ai_model_setup: Duration::from_millis(2500),
            job_matching: Duration::from_millis(120),
            matches_found: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_query_averages() {
        let mut stats = stats();
        assert_eq!(stats.average_query_time(), Duration::ZERO);
        assert_eq!(stats.queries_per_second(), 0.0);

        stats.record_query(Duration::from_secs(1));
        stats.record_query(Duration::from_secs(3));

        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.average_query_time(), Duration::from_secs(2));
        assert_eq!(stats.queries_per_second(), 0.5);
    }

    #[test]
    fn test_setup_share() {
        let stats = stats();
        assert_eq!(stats.setup_time(), Duration::from_secs(5));
        assert_eq!(stats.setup_share(Duration::from_secs(20)), 25.0);
        assert_eq!(stats.setup_share(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_summary_without_queries() {
        let summary = stats().format_summary(Duration::from_secs(20));

        assert!(summary.starts_with("Total Session Time: 20.00s\n"));
        assert!(summary.contains("Resume Processing: 500.0ms"));
        assert!(summary.contains("Setup Time: 5.00s (25.0% of total)"));
        assert!(summary.contains("Search Efficiency: 120.0ms for 5 results"));
        assert!(!summary.contains("Total Queries"));
        assert!(!summary.contains("Q&A Efficiency"));
    }

    #[test]
    fn test_summary_with_queries() {
        let mut stats = stats();
        stats.record_query(Duration::from_secs(90));

        let summary = stats.format_summary(Duration::from_secs(100));
        assert!(summary.contains("Total Queries: 1"));
        assert!(summary.contains("Average Query Time: 1m 30.0s"));
        assert!(summary.contains("Queries per Second: 0.01"));
        assert!(summary.contains("Q&A Efficiency: 1m 30.0s per query"));
    }
}

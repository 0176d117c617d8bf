// file: src/pipeline/session.rs
// description: coordinates resume loading, indexing, job matching and interactive Q&A
// reference: orchestrates the interactive matching workflow step by step

use crate::config::Config;
use crate::database::{EmbeddingClient, VectorStore};
use crate::error::{PipelineError, Result};
use crate::ingest::ResumeProcessor;
use crate::llm::{OllamaClient, QueryEngine};
use crate::models::{Resume, SearchResult};
use crate::pipeline::input::{UserInput, read_job_description, read_question};
use crate::pipeline::stats::SessionStats;
use crate::utils::logging::{
    divider, format_error, format_info, format_section, format_success, format_warning,
};
use crate::utils::{OperationTimer, format_time};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::info;

pub struct MatchingSession {
    config: Config,
    stats: SessionStats,
    show_progress: bool,
}

impl MatchingSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stats: SessionStats::new(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Load and clean every resume, keeping those long enough to index.
    pub async fn process_resumes(&self) -> Result<Vec<Resume>> {
        let resume_config = self.config.resumes.clone();
        let show_progress = self.show_progress;

        println!("{}", format_info("Loading resumes..."));

        let loaded = tokio::task::spawn_blocking(move || {
            let processor = ResumeProcessor::new(resume_config)?.with_progress(show_progress);
            processor
                .load_resumes()
                .map(|loaded| (processor, loaded))
        })
        .await
        .map_err(|e| PipelineError::Validation(format!("Resume loading task failed: {}", e)))?;

        let (processor, loaded) = loaded?;

        if loaded.resumes.is_empty() {
            return Err(PipelineError::Validation(format!(
                "No resumes found in {}",
                processor.resume_dir().display()
            )));
        }

        println!(
            "{}",
            format_success(&format!("Loaded {} resumes", loaded.resumes.len()))
        );
        for resume in &loaded.resumes {
            println!("   {}", resume.filename);
        }

        println!("{}", format_info("Processing resume text..."));
        let cleaned = processor.select_indexable(loaded.resumes);

        if cleaned.is_empty() {
            return Err(PipelineError::Validation(
                "No valid resumes after processing".to_string(),
            ));
        }

        for resume in &cleaned {
            println!(
                "{}",
                format_success(&format!(
                    "Processed: {} ({} chars)",
                    resume.filename,
                    resume.char_count()
                ))
            );
        }

        Ok(cleaned)
    }

    /// Connect LanceDB with the embedding backend available right now.
    pub async fn open_store(&self) -> Result<VectorStore> {
        let ollama = OllamaClient::new(self.config.llm.clone())?;
        let embedder = EmbeddingClient::connect(&self.config.embedding, &ollama).await;
        info!("Using {} embeddings", embedder.backend_name());

        Ok(VectorStore::open(self.config.database.clone(), embedder)
            .await?
            .with_progress(self.show_progress))
    }

    pub async fn build_index(&self, resumes: &[Resume]) -> Result<VectorStore> {
        let store = self.open_store().await?;
        let indexed = store.create_vector_store(resumes).await?;

        println!(
            "{}",
            format_success(&format!(
                "Indexed {} resumes into {}",
                indexed,
                self.config.database.uri
            ))
        );
        Ok(store)
    }

    /// Run the six interactive steps and print the performance summary.
    pub async fn run<R: BufRead>(&mut self, input: &mut R) -> Result<SessionStats> {
        let session_start = Instant::now();

        println!("{}", format_section("STEP 1: RESUME PROCESSING"));
        let timer = OperationTimer::new("Resume processing");
        let resumes = self.process_resumes().await?;
        self.stats.resume_processing = timer.finish_with_count(resumes.len(), "resumes");
        print_step_time(1, self.stats.resume_processing);

        println!("{}", format_section("STEP 2: BUILDING SEARCH DATABASE"));
        let timer = OperationTimer::new("Vector store creation");
        let store = self.build_index(&resumes).await?;
        self.stats.vector_store_creation = timer.finish();
        print_step_time(2, self.stats.vector_store_creation);

        println!("{}", format_section("STEP 3: STARTING AI SYSTEM"));
        let timer = OperationTimer::new("AI model setup");
        let mut engine = QueryEngine::new(
            store,
            self.config.llm.clone(),
            self.config.session.retrieval_k,
        )
        .await?;
        self.stats.ai_model_setup = timer.finish();
        print_step_time(3, self.stats.ai_model_setup);

        println!("{}", format_section("STEP 4: JOB MATCHING"));
        println!("Enter job description (Ctrl+D when done):");
        println!("{}", divider());
        flush_stdout();

        let job_description = read_job_description(input)?;
        if job_description.is_empty() {
            return Err(PipelineError::Validation(
                "No job description provided".to_string(),
            ));
        }

        println!(
            "\n{}",
            format_info(&format!(
                "Job description: {} characters",
                job_description.chars().count()
            ))
        );
        println!("\n{}", format_info("Finding matching candidates..."));

        let matching_start = Instant::now();
        let matches = engine
            .find_matching_resumes(&job_description, self.config.session.top_k)
            .await;
        self.stats.job_matching = matching_start.elapsed();
        self.stats.matches_found = matches.len();

        if matches.is_empty() {
            return Err(PipelineError::Validation("No matches found".to_string()));
        }
        println!(
            "Job matching completed in: {}",
            format_time(self.stats.job_matching)
        );

        println!("{}", format_section("STEP 5: RESULTS"));
        println!("TOP MATCHING CANDIDATES:");
        println!("{}", divider());
        print_matches(&matches, self.config.session.preview_chars);

        println!("{}", format_section("STEP 6: INTERACTIVE Q&A"));
        println!("Ask questions about candidates!");
        println!(
            "Type '{}' to quit",
            self.config.session.exit_keywords.join("', '")
        );
        println!("{}", divider());

        self.question_loop(&mut engine, input).await?;

        let total = session_start.elapsed();
        println!("{}", format_section("PERFORMANCE SUMMARY"));
        println!("{}", self.stats.format_summary(total));
        println!("\n{}", format_success("Thanks for using the ATS!"));

        Ok(self.stats.clone())
    }

    async fn question_loop<R: BufRead>(
        &mut self,
        engine: &mut QueryEngine,
        input: &mut R,
    ) -> Result<()> {
        loop {
            print!("\nQuestion: ");
            flush_stdout();

            let question = match read_question(input, &self.config.session)? {
                UserInput::Exit => break,
                UserInput::Blank => continue,
                UserInput::Question(question) => question,
            };

            let query_start = Instant::now();
            let answer = engine.query(&question).await;
            let elapsed = query_start.elapsed();
            self.stats.record_query(elapsed);

            println!("\nAnswer: {}", answer);
            println!("Query processed in: {}", format_time(elapsed));
        }

        Ok(())
    }
}

pub fn print_matches(matches: &[SearchResult], preview_chars: usize) {
    for result in matches {
        println!("{}. {}", result.rank, result.source);
        println!("   Preview: {}", result.preview(preview_chars));
        println!();
    }
}

pub fn print_failure(message: &str) {
    println!("{}", format_error(message));
}

pub fn print_notice(message: &str) {
    println!("{}", format_warning(message));
}

fn print_step_time(step: usize, elapsed: std::time::Duration) {
    println!("Step {} completed in: {}", step, format_time(elapsed));
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> Config {
        let mut config = Config::default_config();
        config.resumes.dir = temp.path().join("resumes");
        config.database.uri = temp.path().join("lancedb").to_string_lossy().into_owned();
        config.embedding.use_ollama = false;
        config.embedding.dimension = 64;
        config.llm.base_url = "http://127.0.0.1:9".to_string();
        config.llm.connect_attempts = 1;
        config.llm.connect_interval_secs = 0;
        config
    }

    #[tokio::test]
    async fn test_empty_resume_dir_aborts() {
        let temp = TempDir::new().unwrap();
        let session = MatchingSession::new(config(&temp)).with_progress(false);

        let err = session.process_resumes().await.unwrap_err();
        assert!(err.to_string().contains("No resumes found"));
        assert!(temp.path().join("resumes").is_dir());
    }

    #[tokio::test]
    async fn test_run_stops_when_ollama_is_down() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        std::fs::create_dir_all(&config.resumes.dir).unwrap();

        let mut zip = zip::ZipWriter::new(
            std::fs::File::create(config.resumes.dir.join("jane.docx")).unwrap(),
        );
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Jane Doe, platform engineer with eight years of Rust, Kubernetes and Terraform</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();

        let mut session = MatchingSession::new(config).with_progress(false);
        let mut input = Cursor::new("Rust platform engineer\n");

        let err = session.run(&mut input).await.unwrap_err();
        assert!(err.to_string().contains("Could not connect to Ollama"));
        assert!(session.stats().resume_processing > std::time::Duration::ZERO);
        assert!(session.stats().vector_store_creation > std::time::Duration::ZERO);
    }
}

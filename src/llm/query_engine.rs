// file: src/llm/query_engine.rs
// description: resume matching and retrieval-augmented question answering
// reference: retrieve, stuff documents into a prompt, generate with Ollama

use crate::config::LlmConfig;
use crate::database::{Retriever, VectorStore};
use crate::error::Result;
use crate::llm::client::{GenerateResponse, OllamaClient};
use crate::llm::prompt::{PromptTemplate, stuff_documents};
use crate::models::SearchResult;
use std::time::Instant;
use tracing::{error, info, warn};

pub const EMPTY_QUESTION_ANSWER: &str = "Please ask a specific question.";
pub const UNAVAILABLE_ANSWER: &str = "Q&A system not available.";
pub const NO_ANSWER: &str = "I couldn't generate an answer. Please try rephrasing.";

/// How fast the model produced an answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationSpeed {
    /// Tokens per second reported by Ollama
    Measured(f64),
    /// Words per second when Ollama reports no token counts
    Estimated(f64),
}

impl GenerationSpeed {
    pub fn of(response: &GenerateResponse, answer: &str, elapsed_secs: f64) -> Option<Self> {
        match response.tokens_per_second() {
            Some(rate) => Some(Self::Measured(rate)),
            None if elapsed_secs > 0.0 => Some(Self::Estimated(
                answer.split_whitespace().count() as f64 / elapsed_secs,
            )),
            None => None,
        }
    }
}

pub struct QueryEngine {
    store: VectorStore,
    llm: OllamaClient,
    prompt: PromptTemplate,
    retrieval_k: usize,
    retriever: Option<Retriever>,
}

impl QueryEngine {
    /// Connect to Ollama and make sure the chat model is installed.
    ///
    /// An unreachable server is fatal; a failed model pull only warns, the
    /// first generation will report the problem.
    pub async fn new(store: VectorStore, config: LlmConfig, retrieval_k: usize) -> Result<Self> {
        let setup_start = Instant::now();
        info!("Initializing Ollama LLM...");

        let llm = OllamaClient::new(config)?;
        llm.wait_until_ready().await?;

        let model = llm.model().to_string();
        if let Err(e) = llm.ensure_model(&model).await {
            warn!("Could not prepare model {}: {}", model, e);
        }

        info!(
            "LLM setup complete in {:.2}s",
            setup_start.elapsed().as_secs_f64()
        );

        Ok(Self::with_client(store, llm, retrieval_k))
    }

    pub fn with_client(store: VectorStore, llm: OllamaClient, retrieval_k: usize) -> Self {
        Self {
            store,
            llm,
            prompt: PromptTemplate::hr_assistant(),
            retrieval_k,
            retriever: None,
        }
    }

    /// Best `top_k` resumes for a job description. Search failures are logged
    /// and yield no matches.
    pub async fn find_matching_resumes(
        &self,
        job_description: &str,
        top_k: usize,
    ) -> Vec<SearchResult> {
        if job_description.trim().is_empty() {
            return Vec::new();
        }

        let search_start = Instant::now();

        match self.store.search(job_description, top_k).await {
            Ok(results) => {
                let elapsed = search_start.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    results.len() as f64 / elapsed
                } else {
                    0.0
                };
                info!(
                    "Found {} matches in {:.3}s ({:.1} results/second)",
                    results.len(),
                    elapsed,
                    rate
                );
                results
            }
            Err(e) => {
                error!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepare the retriever used by [`QueryEngine::query`].
    pub async fn setup_natural_language_query(&mut self) -> Result<()> {
        let setup_start = Instant::now();
        info!("Setting up Q&A system...");

        let retriever = self.store.retriever(self.retrieval_k).await?;
        info!(
            "Q&A system ready in {:.3}s (retrieving {} resumes per question)",
            setup_start.elapsed().as_secs_f64(),
            retriever.k()
        );

        self.retriever = Some(retriever);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.retriever.is_some()
    }

    /// Answer `question` from the retrieved resumes. Never fails: problems are
    /// reported through the returned text.
    pub async fn query(&mut self, question: &str) -> String {
        if question.trim().is_empty() {
            return EMPTY_QUESTION_ANSWER.to_string();
        }

        let query_start = Instant::now();

        if self.retriever.is_none() {
            let setup_start = Instant::now();
            if let Err(e) = self.setup_natural_language_query().await {
                error!("Q&A setup failed: {}", e);
            }
            info!("Q&A setup time: {:.3}s", setup_start.elapsed().as_secs_f64());
        }

        let Some(retriever) = self.retriever.clone() else {
            return UNAVAILABLE_ANSWER.to_string();
        };

        info!("{} is thinking...", self.llm.model());

        match self.answer(&retriever, question).await {
            Ok(answer) if answer.is_empty() => NO_ANSWER.to_string(),
            Ok(answer) => {
                info!(
                    "Total query time: {:.2}s",
                    query_start.elapsed().as_secs_f64()
                );
                answer
            }
            Err(e) => {
                error!("Query failed: {}", e);
                format!("Sorry, there was an error: {}", e)
            }
        }
    }

    async fn answer(&self, retriever: &Retriever, question: &str) -> Result<String> {
        let retrieval_start = Instant::now();
        let documents = retriever.retrieve(question).await?;
        info!(
            "Retrieved {} resumes in {:.3}s",
            documents.len(),
            retrieval_start.elapsed().as_secs_f64()
        );

        let prompt = self.prompt.render(&stuff_documents(&documents), question);

        let thinking_start = Instant::now();
        let response = self.llm.generate(&prompt).await?;
        let thinking_time = thinking_start.elapsed().as_secs_f64();

        let answer = response.response.trim().to_string();
        info!("AI thinking time: {:.2}s", thinking_time);

        match GenerationSpeed::of(&response, &answer, thinking_time) {
            Some(GenerationSpeed::Measured(rate)) => {
                info!("Generation speed: {:.1} tokens/second", rate)
            }
            Some(GenerationSpeed::Estimated(rate)) => {
                info!("Generation speed: ~{:.1} tokens/second", rate)
            }
            None => {}
        }

        Ok(answer)
    }
}

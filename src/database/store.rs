// file: src/database/store.rs
// description: persisted resume vector store and fixed-k retriever
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::database::client::LanceDbClient;
use crate::database::embeddings::EmbeddingClient;
use crate::database::insert::BatchInserter;
use crate::database::schema::SchemaManager;
use crate::error::{PipelineError, Result};
use crate::models::{Document, Resume, SearchResult};
use crate::pipeline::progress::counted_bar;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resumes whose trimmed text is this short carry nothing worth indexing.
const MIN_DOCUMENT_CHARS: usize = 10;

#[derive(Clone)]
pub struct VectorStore {
    client: LanceDbClient,
    embedder: EmbeddingClient,
    config: DatabaseConfig,
    show_progress: bool,
}

impl VectorStore {
    pub async fn open(config: DatabaseConfig, embedder: EmbeddingClient) -> Result<Self> {
        let client = LanceDbClient::new(config.clone()).await?;

        Ok(Self {
            client,
            embedder,
            config,
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn embedder(&self) -> &EmbeddingClient {
        &self.embedder
    }

    /// Embed `resumes` and replace the on-disk table with them.
    ///
    /// Returns the number of indexed documents.
    pub async fn create_vector_store(&self, resumes: &[Resume]) -> Result<usize> {
        let total_start = Instant::now();

        if resumes.is_empty() {
            return Err(PipelineError::Validation(
                "No documents provided".to_string(),
            ));
        }

        info!("Creating vector store from {} resumes", resumes.len());

        let prep_start = Instant::now();
        let documents: Vec<Document> = resumes
            .iter()
            .filter(|resume| {
                let keep = resume.cleaned_text.trim().chars().count() > MIN_DOCUMENT_CHARS;
                if !keep {
                    warn!("Skipping {}: text too short to index", resume.filename);
                }
                keep
            })
            .map(|resume| {
                Document::new(
                    resume.filename.clone(),
                    &resume.cleaned_text,
                    self.config.max_content_chars,
                )
            })
            .collect();

        if documents.is_empty() {
            return Err(PipelineError::Validation(
                "No valid documents".to_string(),
            ));
        }

        let truncated = documents.iter().filter(|d| d.is_truncated()).count();
        if truncated > 0 {
            debug!(
                "{} documents truncated to {} chars",
                truncated, self.config.max_content_chars
            );
        }
        info!(
            "Prepared {} documents in {:.2}s",
            documents.len(),
            prep_start.elapsed().as_secs_f64()
        );

        let embed_start = Instant::now();
        let embeddings = self.embed_documents(&documents).await?;
        info!(
            "Generated {} embeddings ({}) in {:.2}s",
            embeddings.len(),
            self.embedder.backend_name(),
            embed_start.elapsed().as_secs_f64()
        );

        let save_start = Instant::now();
        let inserted = BatchInserter::new(
            &self.client,
            self.embedder.dimension(),
            self.embedder.backend_name(),
        )
        .replace_all(&documents, &embeddings)
        .await?;
        info!(
            "Vector store saved to {} in {:.2}s",
            self.client.uri(),
            save_start.elapsed().as_secs_f64()
        );

        let total = total_start.elapsed().as_secs_f64();
        let rate = if total > 0.0 { inserted as f64 / total } else { 0.0 };
        info!(
            "Vector store created in {:.2}s ({:.1} docs/second)",
            total, rate
        );

        Ok(inserted)
    }

    async fn embed_documents(&self, documents: &[Document]) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.client.batch_size().max(1);
        let bar = counted_bar(documents.len() as u64, "Embedding resumes");
        if !self.show_progress {
            bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let mut embeddings = Vec::with_capacity(documents.len());

        for chunk in documents.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|d| d.content.clone()).collect();
            let vectors = match self.embedder.embed_batch(&texts).await {
                Ok(vectors) => vectors,
                Err(e) => {
                    bar.abandon_with_message("Embedding failed");
                    return Err(e);
                }
            };
            embeddings.extend(vectors);
            bar.inc(chunk.len() as u64);
        }

        bar.finish_and_clear();
        Ok(embeddings)
    }

    /// Top `k` resumes for `query`, most similar first.
    ///
    /// A query without a single searchable term has no direction to compare
    /// against and yields no matches.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.ensure_searchable().await?;

        let query_embedding = self.embedder.embed(query).await?;
        if query_embedding.iter().all(|x| *x == 0.0) {
            warn!("Query has no searchable terms: {:?}", query);
            return Ok(Vec::new());
        }

        self.client.vector_search(query_embedding, k).await
    }

    pub async fn retriever(&self, k: usize) -> Result<Retriever> {
        self.ensure_searchable().await?;

        Ok(Retriever {
            store: self.clone(),
            k,
        })
    }

    /// The table must exist and its vectors must come from the same backend
    /// as the query vectors.
    async fn ensure_searchable(&self) -> Result<()> {
        if !self.is_initialized().await? {
            return Err(PipelineError::Database(
                "Vector store not initialized".to_string(),
            ));
        }

        let current = self.embedder.backend_name();
        match SchemaManager::new(&self.client).embedding_backend().await? {
            Some(stored) if stored != current => Err(PipelineError::Embedding(format!(
                "Index was built with {} embeddings but {} is active. Rebuild it with `resume_rag index`",
                stored, current
            ))),
            Some(_) => Ok(()),
            None => {
                warn!("Index does not record its embedding backend, assuming {}", current);
                Ok(())
            }
        }
    }

    pub async fn count(&self) -> Result<u64> {
        self.client.get_document_count().await
    }

    pub async fn is_initialized(&self) -> Result<bool> {
        self.client.table_exists(self.client.table_name()).await
    }

    pub async fn reset(&self) -> Result<()> {
        SchemaManager::new(&self.client).drop_all_tables().await
    }
}

/// Searches its store with a fixed number of results.
#[derive(Clone)]
pub struct Retriever {
    store: VectorStore,
    k: usize,
}

impl Retriever {
    pub fn k(&self) -> usize {
        self.k
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.store.search(query, self.k).await
    }
}

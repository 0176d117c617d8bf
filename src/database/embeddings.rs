// file: src/database/embeddings.rs
// description: text embeddings via the Ollama embed API with a local hashing fallback
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-embeddings

use crate::config::EmbeddingConfig;
use crate::error::{PipelineError, Result};
use crate::llm::OllamaClient;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, warn};

const EMBED_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub enum EmbeddingBackend {
    Ollama { client: OllamaClient, model: String },
    Hashing,
}

/// Produces L2-normalized vectors of a fixed dimension. The backend is chosen
/// once, so every vector of one index comes from the same model.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    backend: EmbeddingBackend,
    dimension: usize,
}

impl EmbeddingClient {
    pub fn hashing(dimension: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            dimension,
        }
    }

    pub fn ollama(client: OllamaClient, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Ollama {
                client,
                model: model.into(),
            },
            dimension,
        }
    }

    /// Pick the Ollama backend when it is enabled, reachable and returns vectors
    /// of the configured dimension; otherwise fall back to hashing embeddings.
    pub async fn connect(config: &EmbeddingConfig, ollama: &OllamaClient) -> Self {
        if !config.use_ollama {
            info!("Ollama embeddings disabled, using local hashing embeddings");
            return Self::hashing(config.dimension);
        }

        if let Err(e) = ollama.ensure_model(&config.model).await {
            warn!(
                "Embedding model {} unavailable ({}). Using local hashing embeddings.",
                config.model, e
            );
            return Self::hashing(config.dimension);
        }

        let candidate = Self::ollama(ollama.clone(), config.model.clone(), config.dimension);

        match candidate.embed("dimension check").await {
            Ok(_) => {
                info!(
                    "Embeddings model loaded: {} ({} dims)",
                    config.model, config.dimension
                );
                candidate
            }
            Err(e) => {
                warn!("Ollama embeddings failed: {}. Using local hashing embeddings.", e);
                Self::hashing(config.dimension)
            }
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn backend_name(&self) -> String {
        match &self.backend {
            EmbeddingBackend::Ollama { model, .. } => format!("ollama:{}", model),
            EmbeddingBackend::Hashing => "hashing".to_string(),
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Embedding("No embedding returned".to_string()))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match &self.backend {
            EmbeddingBackend::Hashing => Ok(texts
                .iter()
                .map(|text| hashing_embedding(text, self.dimension))
                .collect()),
            EmbeddingBackend::Ollama { client, model } => {
                let vectors = request_embeddings(client, model, texts).await?;

                if vectors.len() != texts.len() {
                    return Err(PipelineError::Embedding(format!(
                        "Expected {} embeddings, received {}",
                        texts.len(),
                        vectors.len()
                    )));
                }

                vectors
                    .into_iter()
                    .map(|vector| {
                        if vector.len() != self.dimension {
                            return Err(PipelineError::Embedding(format!(
                                "Embedding dimension {} does not match configured {}",
                                vector.len(),
                                self.dimension
                            )));
                        }
                        Ok(l2_normalize(vector))
                    })
                    .collect()
            }
        }
    }
}

async fn request_embeddings(
    client: &OllamaClient,
    model: &str,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    debug!("Requesting {} embeddings from {}", texts.len(), model);

    let response = client
        .http()
        .post(client.url("/api/embed"))
        .timeout(EMBED_TIMEOUT)
        .json(&OllamaEmbedRequest {
            model,
            input: texts,
        })
        .send()
        .await
        .map_err(|e| PipelineError::Embedding(format!("Failed to send embed request: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(PipelineError::Embedding(format!(
            "Embed request failed with status {}: {}",
            status, error_text
        )));
    }

    let body: OllamaEmbedResponse = response
        .json()
        .await
        .map_err(|e| PipelineError::Embedding(format!("Failed to parse embed response: {}", e)))?;

    Ok(body.embeddings)
}

/// Deterministic bag-of-words embedding using the hashing trick.
///
/// Tokens are lowercase alphanumeric runs; each token adds +1 or -1 to one
/// bucket picked by its SHA-256 digest. Text without tokens maps to the zero
/// vector.
pub fn hashing_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimension];
    if dimension == 0 {
        return vector;
    }

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let digest = Sha256::digest(token.to_lowercase().as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(bytes);

        let bucket = (hash % dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }

    l2_normalize(vector)
}

pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}

// file: src/llm/client.rs
// description: Ollama HTTP client for readiness checks, model pulls and generation
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::config::LlmConfig;
use crate::error::{PipelineError, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Generation time in nanoseconds
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

impl GenerateResponse {
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(nanos)) if nanos > 0 => {
                Some(count as f64 / Duration::from_nanos(nanos).as_secs_f64())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse one NDJSON line of a streamed pull response.
pub fn parse_pull_line(line: &[u8]) -> Option<PullStatus> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_slice(line) {
        Ok(status) => Some(status),
        Err(e) => {
            debug!("Ignoring malformed pull status line: {}", e);
            None
        }
    }
}

/// True when `model` is installed. A model without a tag matches any tag of
/// the same name (`llama2` matches `llama2:7b`).
pub fn model_available(installed: &[String], model: &str) -> bool {
    installed.iter().any(|name| {
        name == model
            || (!model.contains(':')
                && name
                    .strip_prefix(model)
                    .is_some_and(|rest| rest.starts_with(':')))
    })
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(TAGS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    pub async fn is_reachable(&self) -> bool {
        self.list_models().await.is_ok()
    }

    /// Poll `/api/tags` until Ollama answers or the attempts run out.
    pub async fn wait_until_ready(&self) -> Result<Duration> {
        let start = Instant::now();
        let attempts = self.config.connect_attempts.max(1);
        info!("Connecting to Ollama at {}", self.base_url());

        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.list_models().await {
                Ok(_) => {
                    let elapsed = start.elapsed();
                    info!("Ollama connected in {:.2}s", elapsed.as_secs_f64());
                    return Ok(elapsed);
                }
                Err(e) => {
                    debug!("Ollama not ready: {}", e);
                    if attempt < attempts {
                        info!("Waiting for Ollama... ({}/{})", attempt, attempts);
                        tokio::time::sleep(Duration::from_secs(
                            self.config.connect_interval_secs,
                        ))
                        .await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(PipelineError::Llm(format!(
            "Could not connect to Ollama at {} after {} attempts: {}",
            self.base_url(),
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Make sure `model` is installed, pulling it when allowed.
    pub async fn ensure_model(&self, model: &str) -> Result<()> {
        let check_start = Instant::now();
        let installed = self.list_models().await?;

        if model_available(&installed, model) {
            info!(
                "{} ready (checked in {:.2}s)",
                model,
                check_start.elapsed().as_secs_f64()
            );
            return Ok(());
        }

        if !self.config.auto_pull {
            return Err(PipelineError::Llm(format!(
                "Model {} is not installed and auto_pull is disabled",
                model
            )));
        }

        self.pull_model(model).await
    }

    pub async fn pull_model(&self, model: &str) -> Result<()> {
        let start = Instant::now();
        info!("Downloading {} (one-time, this can take several minutes)", model);

        let response = self
            .client
            .post(self.url("/api/pull"))
            .timeout(Duration::from_secs(self.config.pull_timeout_secs))
            .json(&PullRequest {
                model,
                stream: true,
            })
            .send()
            .await?
            .error_for_status()?;

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░"),
        );

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                if let Some(status) = parse_pull_line(&line) {
                    apply_pull_status(&bar, &status)?;
                }
            }
        }

        if let Some(status) = parse_pull_line(&buffer) {
            apply_pull_status(&bar, &status)?;
        }

        bar.finish_and_clear();
        info!(
            "Download of {} complete in {:.1} minutes",
            model,
            start.elapsed().as_secs_f64() / 60.0
        );
        Ok(())
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
        };

        debug!(
            "Requesting completion from {} for {} prompt chars",
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Llm(format!(
                "Ollama generate failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

fn apply_pull_status(bar: &ProgressBar, status: &PullStatus) -> Result<()> {
    if let Some(error) = &status.error {
        bar.abandon_with_message("pull failed");
        return Err(PipelineError::Llm(format!("Model pull failed: {}", error)));
    }

    if let (Some(total), Some(completed)) = (status.total, status.completed) {
        bar.set_length(total);
        bar.set_position(completed);
    }

    if !status.status.is_empty() {
        bar.set_message(status.status.clone());
    }

    Ok(())
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::MockOllama;

    fn unreachable_config() -> LlmConfig {
        let mut config = Config::default_config().llm;
        config.base_url = "http://127.0.0.1:9".to_string();
        config.connect_attempts = 2;
        config.connect_interval_secs = 0;
        config.request_timeout_secs = 5;
        config
    }

    #[test]
    fn test_model_available() {
        let installed = vec!["llama2:7b".to_string(), "all-minilm:latest".to_string()];

        assert!(model_available(&installed, "llama2:7b"));
        assert!(model_available(&installed, "llama2"));
        assert!(model_available(&installed, "all-minilm"));
        assert!(!model_available(&installed, "llama2:13b"));
        assert!(!model_available(&installed, "llama"));
        assert!(!model_available(&[], "llama2"));
    }

    #[test]
    fn test_parse_pull_line() {
        let status =
            parse_pull_line(br#"{"status":"pulling abc","total":100,"completed":40}"#).unwrap();
        assert_eq!(status.status, "pulling abc");
        assert_eq!(status.total, Some(100));
        assert_eq!(status.completed, Some(40));

        let done = parse_pull_line(b"{\"status\":\"success\"}\n").unwrap();
        assert_eq!(done.status, "success");
        assert_eq!(done.total, None);

        assert!(parse_pull_line(b"   ").is_none());
        assert!(parse_pull_line(b"not json").is_none());
    }

    #[test]
    fn test_pull_error_status_is_an_error() {
        let bar = ProgressBar::hidden();
        let status = PullStatus {
            error: Some("pull model manifest: file does not exist".to_string()),
            ..Default::default()
        };
        assert!(apply_pull_status(&bar, &status).is_err());
    }

    #[test]
    fn test_tokens_per_second() {
        let response = GenerateResponse {
            response: "ok".to_string(),
            eval_count: Some(50),
            eval_duration: Some(2_000_000_000),
        };
        assert_eq!(response.tokens_per_second(), Some(25.0));
        assert_eq!(GenerateResponse::default().tokens_per_second(), None);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let mut config = unreachable_config();
        config.base_url = "http://localhost:11434/".to_string();
        let client = OllamaClient::new(config).unwrap();
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_wait_until_ready_gives_up() {
        let client = OllamaClient::new(unreachable_config()).unwrap();
        let result = tokio_test::block_on(client.wait_until_ready());

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Could not connect to Ollama"));
    }

    #[tokio::test]
    async fn test_generate_against_unreachable_server() {
        let client = OllamaClient::new(unreachable_config()).unwrap();
        assert!(!client.is_reachable().await);
        assert!(client.generate("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_list_models_and_generate() {
        let ollama = MockOllama::start(&[
            (
                "/api/tags",
                r#"{"models":[{"name":"llama2:7b"},{"name":"all-minilm:latest"}]}"#,
            ),
            (
                "/api/generate",
                r#"{"response":"Alice","eval_count":8,"eval_duration":400000000}"#,
            ),
        ])
        .await;
        let client = OllamaClient::new(ollama.llm_config()).unwrap();

        assert_eq!(
            client.list_models().await.unwrap(),
            vec!["llama2:7b".to_string(), "all-minilm:latest".to_string()]
        );
        assert!(client.wait_until_ready().await.is_ok());

        let response = client.generate("Who knows Rust?").await.unwrap();
        assert_eq!(response.response, "Alice");
        assert_eq!(response.tokens_per_second(), Some(20.0));

        let sent = ollama.bodies("/api/generate");
        assert!(sent[0].contains(r#""stream":false"#));
        assert!(sent[0].contains("Who knows Rust?"));
    }

    #[tokio::test]
    async fn test_ensure_model_pulls_missing_model() {
        let ollama = MockOllama::start(&[
            ("/api/tags", r#"{"models":[]}"#),
            (
                "/api/pull",
                "{\"status\":\"pulling manifest\"}\n{\"status\":\"downloading\",\"total\":100,\"completed\":40}\n{\"status\":\"success\"}\n",
            ),
        ])
        .await;
        let client = OllamaClient::new(ollama.llm_config()).unwrap();

        client.ensure_model("llama2:7b").await.unwrap();

        let pulls = ollama.bodies("/api/pull");
        assert_eq!(pulls.len(), 1);
        assert!(pulls[0].contains(r#""model":"llama2:7b""#));
    }

    #[tokio::test]
    async fn test_ensure_model_skips_installed_model() {
        let ollama = MockOllama::start(&[("/api/tags", r#"{"models":[{"name":"llama2:7b"}]}"#)])
            .await;
        let client = OllamaClient::new(ollama.llm_config()).unwrap();

        client.ensure_model("llama2").await.unwrap();
        assert!(ollama.bodies("/api/pull").is_empty());
    }

    #[tokio::test]
    async fn test_pull_reports_streamed_error() {
        let ollama = MockOllama::start(&[(
            "/api/pull",
            "{\"status\":\"pulling manifest\"}\n{\"error\":\"pull model manifest: file does not exist\"}\n",
        )])
        .await;
        let client = OllamaClient::new(ollama.llm_config()).unwrap();

        let err = client.pull_model("nope:1b").await.unwrap_err();
        assert!(err.to_string().contains("file does not exist"));
    }

    #[tokio::test]
    async fn test_ensure_model_without_auto_pull() {
        let ollama = MockOllama::start(&[("/api/tags", r#"{"models":[]}"#)]).await;
        let mut config = ollama.llm_config();
        config.auto_pull = false;
        let client = OllamaClient::new(config).unwrap();

        let err = client.ensure_model("llama2:7b").await.unwrap_err();
        assert!(err.to_string().contains("auto_pull is disabled"));
        assert!(ollama.bodies("/api/pull").is_empty());
    }

    #[tokio::test]
    async fn test_generate_reports_http_errors() {
        let ollama = MockOllama::start(&[]).await;
        let client = OllamaClient::new(ollama.llm_config()).unwrap();

        let err = client.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}

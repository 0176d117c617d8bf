// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub resumes: ResumeConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResumeConfig {
    pub dir: PathBuf,
    /// Cleaned resumes must be longer than this many characters to be indexed.
    pub min_chars: usize,
    pub max_file_size_mb: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
    pub batch_size: usize,
    pub max_content_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub use_ollama: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub connect_attempts: u32,
    pub connect_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub pull_timeout_secs: u64,
    pub auto_pull: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub top_k: usize,
    pub retrieval_k: usize,
    pub preview_chars: usize,
    pub exit_keywords: Vec<String>,
}

impl Config {
    /// Layer the built-in defaults, the TOML file at `path` (when given) and
    /// `RESUME_RAG__*` environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RESUME_RAG")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.apply_ollama_env();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        let mut config = Self {
            resumes: ResumeConfig {
                dir: PathBuf::from("data/resumes"),
                min_chars: 50,
                max_file_size_mb: 20,
            },
            database: DatabaseConfig {
                uri: "data/lancedb".to_string(),
                table_name: "resumes".to_string(),
                batch_size: 16,
                max_content_chars: 4000,
            },
            embedding: EmbeddingConfig {
                model: "all-minilm".to_string(),
                dimension: 384,
                use_ollama: true,
            },
            llm: LlmConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "llama2:7b".to_string(),
                temperature: 0.2,
                connect_attempts: 30,
                connect_interval_secs: 3,
                request_timeout_secs: 600,
                pull_timeout_secs: 1800,
                auto_pull: true,
            },
            session: SessionConfig {
                top_k: 5,
                retrieval_k: 3,
                preview_chars: 150,
                exit_keywords: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
            },
        };
        config.apply_ollama_env();
        config
    }

    /// `OLLAMA_BASE_URL` wins over the file so docker setups keep working.
    fn apply_ollama_env(&mut self) {
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL")
            && !url.trim().is_empty()
        {
            self.llm.base_url = url.trim().trim_end_matches('/').to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resumes.dir.as_os_str().is_empty() {
            return Err(PipelineError::Config(
                "resumes.dir must not be empty".to_string(),
            ));
        }

        if self.database.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.database.max_content_chars == 0 {
            return Err(PipelineError::Config(
                "max_content_chars must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(PipelineError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        if self.session.top_k == 0 || self.session.retrieval_k == 0 {
            return Err(PipelineError::Config(
                "top_k and retrieval_k must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PipelineError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }

        crate::utils::Validator::validate_url(&self.llm.base_url)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(())
    }
}

impl SessionConfig {
    pub fn is_exit_keyword(&self, input: &str) -> bool {
        let input = input.trim();
        self.exit_keywords
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.max_content_chars, 4000);
        assert_eq!(config.session.top_k, 5);
        assert_eq!(config.session.retrieval_k, 3);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = Config::default_config();
        config.database.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_temperature_and_url() {
        let mut config = Config::default_config();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.llm.base_url = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exit_keywords_case_insensitive() {
        let session = Config::default_config().session;
        assert!(session.is_exit_keyword("exit"));
        assert!(session.is_exit_keyword("  QUIT "));
        assert!(session.is_exit_keyword("Bye"));
        assert!(!session.is_exit_keyword("who knows rust?"));
    }

    #[test]
    fn test_load_without_file_keeps_env_overrides() {
        // only this test reads the variable
        unsafe { std::env::set_var("RESUME_RAG__SESSION__PREVIEW_CHARS", "42") };
        let config = Config::load(None);
        unsafe { std::env::remove_var("RESUME_RAG__SESSION__PREVIEW_CHARS") };

        let config = config.unwrap();
        assert_eq!(config.session.preview_chars, 42);
        assert_eq!(config.session.top_k, 5);
        assert_eq!(config.database.uri, "data/lancedb");
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[session]\ntop_k = 8\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.session.top_k, 8);
        assert_eq!(config.session.retrieval_k, 3);
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[resumes]
dir = "fixtures/resumes"
min_chars = 20
max_file_size_mb = 5

[database]
uri = "fixtures/lancedb"
table_name = "candidates"
batch_size = 8
max_content_chars = 2000

[embedding]
model = "all-minilm"
dimension = 384
use_ollama = false

[llm]
base_url = "http://127.0.0.1:11434"
model = "llama2:7b"
temperature = 0.2
connect_attempts = 2
connect_interval_secs = 1
request_timeout_secs = 60
pull_timeout_secs = 60
auto_pull = false

[session]
top_k = 3
retrieval_k = 2
preview_chars = 100
exit_keywords = ["exit"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database.table_name, "candidates");
        assert_eq!(config.resumes.min_chars, 20);
        assert!(!config.embedding.use_ollama);
        assert_eq!(config.session.exit_keywords, vec!["exit".to_string()]);
    }
}

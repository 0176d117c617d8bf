// file: src/llm/mod.rs
// description: local LLM access through Ollama and the resume query engine
// reference: internal module structure

pub mod client;
pub mod prompt;
pub mod query_engine;

pub use client::{GenerateResponse, OllamaClient, model_available};
pub use prompt::{PromptTemplate, stuff_documents};
pub use query_engine::{GenerationSpeed, QueryEngine};

// file: src/database/mod.rs
// description: database operations module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;
pub mod insert;
pub mod schema;
pub mod store;

pub use client::LanceDbClient;
pub use embeddings::{EmbeddingBackend, EmbeddingClient, hashing_embedding};
pub use insert::BatchInserter;
pub use schema::SchemaManager;
pub use store::{Retriever, VectorStore};

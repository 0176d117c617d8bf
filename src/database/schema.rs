// file: src/database/schema.rs
// description: LanceDB schema management for the resume vector table
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::error::{PipelineError, Result};
use arrow_schema::{DataType, Field, Schema};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Schema metadata key naming the embedding backend that built the table.
pub const EMBEDDING_BACKEND_KEY: &str = "embedding_backend";

pub struct SchemaManager<'a> {
    client: &'a LanceDbClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            warn!("Table '{}' does not exist", table_name);
            return Ok(false);
        }

        info!("Table '{}' exists", table_name);
        Ok(true)
    }

    /// Embedding backend recorded when the table was built, if any.
    pub async fn embedding_backend(&self) -> Result<Option<String>> {
        let table = self.client.get_table(self.client.table_name()).await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to read table schema: {}", e)))?;

        Ok(schema.metadata().get(EMBEDDING_BACKEND_KEY).cloned())
    }

    /// Arrow schema of the resumes table. `embedding` holds one
    /// `embedding_dim`-wide vector per resume, produced by `embedding_backend`.
    pub fn resumes_schema(embedding_dim: usize, embedding_backend: &str) -> Arc<Schema> {
        let fields = vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("length", DataType::UInt64, false),
            Field::new("indexed_at", DataType::UInt64, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ];
        let metadata = HashMap::from([(
            EMBEDDING_BACKEND_KEY.to_string(),
            embedding_backend.to_string(),
        )]);

        Arc::new(Schema::new_with_metadata(fields, metadata))
    }

    pub async fn drop_all_tables(&self) -> Result<()> {
        warn!("Dropping all tables in LanceDB");

        let table_name = self.client.table_name();

        if self.client.table_exists(table_name).await? {
            self.client
                .get_connection()
                .drop_table(table_name)
                .await
                .map_err(|e| {
                    PipelineError::Database(format!("Failed to drop table {}: {}", table_name, e))
                })?;
            info!("Dropped table: {}", table_name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema = SchemaManager::resumes_schema(384, "ollama:all-minilm");
        assert_eq!(schema.fields().len(), 6);
        assert_eq!(
            schema.metadata().get(EMBEDDING_BACKEND_KEY).map(String::as_str),
            Some("ollama:all-minilm")
        );

        let embedding_field = schema.field_with_name("embedding").unwrap();
        assert!(matches!(
            embedding_field.data_type(),
            DataType::FixedSizeList(_, 384)
        ));
        assert_eq!(
            schema.field_with_name("length").unwrap().data_type(),
            &DataType::UInt64
        );
    }
}

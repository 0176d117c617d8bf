// file: src/database/insert.rs
// description: LanceDB batch insertion of resume documents with their embeddings
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::database::schema::SchemaManager;
use crate::error::{PipelineError, Result};
use crate::models::Document;
use arrow_array::{
    FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt64Array,
};
use arrow_schema::Schema;
use std::sync::Arc;
use tracing::{debug, info};

pub struct BatchInserter<'a> {
    client: &'a LanceDbClient,
    embedding_dim: usize,
    embedding_backend: String,
}

impl<'a> BatchInserter<'a> {
    pub fn new(client: &'a LanceDbClient, embedding_dim: usize, embedding_backend: String) -> Self {
        Self {
            client,
            embedding_dim,
            embedding_backend,
        }
    }

    /// Replace the resumes table with `documents`. Any existing table is
    /// dropped first so the index always reflects a single build.
    pub async fn replace_all(
        &self,
        documents: &[Document],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        if documents.len() != embeddings.len() {
            return Err(PipelineError::Database(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        if documents.is_empty() {
            return Err(PipelineError::Validation(
                "No documents to insert".to_string(),
            ));
        }

        let schema = SchemaManager::resumes_schema(self.embedding_dim, &self.embedding_backend);
        let record_batch = Self::create_record_batch(schema.clone(), documents, embeddings)?;

        SchemaManager::new(self.client).drop_all_tables().await?;

        let table_name = self.client.table_name();
        self.client
            .get_connection()
            .create_table(
                table_name,
                RecordBatchIterator::new(vec![Ok(record_batch)], schema),
            )
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to create table: {}", e)))?;

        info!(
            "Created table {} with {} documents ({} embeddings)",
            table_name,
            documents.len(),
            self.embedding_backend
        );
        Ok(documents.len())
    }

    /// Create an Arrow RecordBatch from documents and embeddings
    fn create_record_batch(
        schema: Arc<Schema>,
        documents: &[Document],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch> {
        let dim = match schema.field_with_name("embedding").map(|f| f.data_type()) {
            Ok(arrow_schema::DataType::FixedSizeList(_, dim)) => *dim,
            _ => {
                return Err(PipelineError::Database(
                    "Schema has no embedding column".to_string(),
                ));
            }
        };

        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim as usize) {
            return Err(PipelineError::Database(format!(
                "Embedding has {} dimensions, table expects {}",
                bad.len(),
                dim
            )));
        }

        let ids: StringArray = documents
            .iter()
            .map(|doc| Some(doc.content_hash.as_str()))
            .collect();

        let sources: StringArray = documents
            .iter()
            .map(|doc| Some(doc.source.as_str()))
            .collect();

        let contents: StringArray = documents
            .iter()
            .map(|doc| Some(doc.content.as_str()))
            .collect();

        let lengths: UInt64Array = documents.iter().map(|doc| Some(doc.length)).collect();

        let indexed_ats: UInt64Array = documents.iter().map(|doc| Some(doc.indexed_at)).collect();

        let embedding_values: Float32Array = embeddings
            .iter()
            .flat_map(|emb| emb.iter().copied())
            .collect();

        let embedding_list = FixedSizeListArray::try_new_from_values(embedding_values, dim)
            .map_err(|e| {
                PipelineError::Database(format!("Failed to create embedding array: {}", e))
            })?;

        debug!("Built record batch with {} rows", documents.len());

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(sources),
                Arc::new(contents),
                Arc::new(lengths),
                Arc::new(indexed_ats),
                Arc::new(embedding_list),
            ],
        )
        .map_err(|e| PipelineError::Database(format!("Failed to create record batch: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<Document> {
        vec![
            Document::new("a.pdf".to_string(), "Rust engineer", 100),
            Document::new("b.docx".to_string(), "Data scientist", 100),
        ]
    }

    #[test]
    fn test_create_record_batch() {
        let schema = SchemaManager::resumes_schema(3, "hashing");
        let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];

        let batch =
            BatchInserter::create_record_batch(schema, &documents(), &embeddings).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);
    }

    #[test]
    fn test_record_batch_rejects_wrong_dimension() {
        let schema = SchemaManager::resumes_schema(4, "hashing");
        let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];

        let result = BatchInserter::create_record_batch(schema, &documents(), &embeddings);
        assert!(result.is_err());
    }
}

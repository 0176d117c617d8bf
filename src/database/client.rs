// file: src/database/client.rs
// description: LanceDB client wrapper with connection management and vector search
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};
use crate::models::{SearchResult, rank_results};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt64Array};
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table, connect};
use tracing::{debug, info};

#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        self.connection
            .table_names()
            .execute()
            .await
            .map(|_| true)
            .map_err(|e| PipelineError::Database(format!("LanceDB connection failed: {}", e)))
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    pub async fn get_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| {
                PipelineError::Database(format!("Failed to open table {}: {}", table_name, e))
            })
    }

    pub async fn get_document_count(&self) -> Result<u64> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(0);
        }

        let table = self.get_table(&self.config.table_name).await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Cosine nearest-neighbour search, ranked from most to least similar.
    ///
    /// Returns an empty list when the table does not exist.
    pub async fn vector_search(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;

        debug!("Performing vector search with limit {}", limit);

        let mut results_stream = table
            .vector_search(query_embedding)
            .map_err(|e| PipelineError::Database(format!("Failed to create vector search: {}", e)))?
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result.map_err(|e| {
                PipelineError::Database(format!("Failed to read result batch: {}", e))
            })?;

            search_results.extend(rows_from_batch(&batch)?);
        }

        debug!("Vector search returned {} results", search_results.len());
        Ok(rank_results(search_results))
    }
}

fn rows_from_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
    let ids = column::<StringArray>(batch, "id")?;
    let sources = column::<StringArray>(batch, "source")?;
    let contents = column::<StringArray>(batch, "content")?;
    let lengths = column::<UInt64Array>(batch, "length")?;

    // LanceDB appends the distance as `_distance`
    let distances = batch
        .column_by_name("_distance")
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    Ok((0..batch.num_rows())
        .map(|i| {
            SearchResult::new(
                ids.value(i).to_string(),
                sources.value(i).to_string(),
                contents.value(i).to_string(),
                lengths.value(i),
                distances.map(|d| d.value(i)),
            )
        })
        .collect())
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PipelineError::Database(format!("Invalid '{}' column type", name)))
}

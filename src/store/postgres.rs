//! Postgres-backed label store
//!
//! Source tables are read with one UNION query; the destination table is
//! truncated once per run and then filled batch by batch with UNNEST.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{build_extract_query, quote_table_name, LabelStore};
use crate::error::StoreError;
use crate::wikidata::LabelBatch;

pub struct PgLabelStore {
    pool: PgPool,
    /// Quoted destination table name
    storage: String,
}

impl PgLabelStore {
    pub fn new(pool: PgPool, storage_table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            pool,
            storage: quote_table_name(storage_table)?,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Flatten a batch into parallel (id, key, label) arrays for UNNEST
fn flatten_batch(batch: &LabelBatch) -> (Vec<i64>, Vec<String>, Vec<String>) {
    let size: usize = batch.values().map(|record| record.len()).sum();
    let mut ids = Vec::with_capacity(size);
    let mut keys = Vec::with_capacity(size);
    let mut labels = Vec::with_capacity(size);

    for (id, record) in batch {
        for (key, label) in record.iter() {
            ids.push(id.value());
            keys.push(key.to_string());
            labels.push(label.to_string());
        }
    }

    (ids, keys, labels)
}

#[async_trait]
impl LabelStore for PgLabelStore {
    async fn wikidata_values(&self, tables: &[String]) -> Result<Vec<String>, StoreError> {
        let sql = build_extract_query(tables)?;
        tracing::debug!(sql = %sql, "Fetching wikidata ids");

        let values: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(values)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {} (id bigint PRIMARY KEY, labels hstore)",
            self.storage
        );
        sqlx::query(&create).execute(&self.pool).await?;

        let truncate = format!("TRUNCATE {}", self.storage);
        sqlx::query(&truncate).execute(&self.pool).await?;

        tracing::debug!(table = %self.storage, "Truncated label table");
        Ok(())
    }

    async fn insert_labels(&self, batch: &LabelBatch) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let (ids, keys, labels) = flatten_batch(batch);

        // One row per id; its labels are folded into a single hstore
        let sql = format!(
            r#"
            INSERT INTO {} (id, labels)
            SELECT u.id, hstore(array_agg(u.key ORDER BY u.key), array_agg(u.label ORDER BY u.key))
            FROM UNNEST($1::bigint[], $2::text[], $3::text[]) AS u(id, key, label)
            GROUP BY u.id
            "#,
            self.storage
        );

        let result = sqlx::query(&sql)
            .bind(&ids)
            .bind(&keys)
            .bind(&labels)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

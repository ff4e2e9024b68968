//! Label storage
//!
//! `LabelStore` is the seam between the pipeline and the database: it reads
//! raw `wikidata` tag values from the source tables and owns the
//! destination table.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::wikidata::{EntityId, LabelBatch};

#[cfg(feature = "database")]
pub mod postgres;

#[cfg(feature = "database")]
pub use postgres::PgLabelStore;

/// Postgres regex matching a well-formed wikidata id
pub const WIKIDATA_ID_PATTERN: &str = "^Q[1-9][0-9]{0,18}$";

#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Distinct `wikidata` tag values across `tables`.
    ///
    /// `tables` must not be empty.
    async fn wikidata_values(&self, tables: &[String]) -> Result<Vec<String>, StoreError>;

    /// Create the destination table if needed and remove all its rows
    async fn reset(&self) -> Result<(), StoreError>;

    /// Insert one row per entity in `batch`, returning the number of rows written
    async fn insert_labels(&self, batch: &LabelBatch) -> Result<u64, StoreError>;
}

/// Parse tag values into sorted, distinct ids, dropping malformed values
pub fn collect_entity_ids<I, S>(values: I) -> Vec<EntityId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ids: BTreeSet<EntityId> = values
        .into_iter()
        .filter_map(|v| EntityId::parse(v.as_ref()))
        .collect();
    ids.into_iter().collect()
}

/// Fetch and validate every referenced entity id
pub async fn extract_ids<S: LabelStore + ?Sized>(
    store: &S,
    tables: &[String],
) -> Result<Vec<EntityId>, StoreError> {
    let values = store.wikidata_values(tables).await?;
    let ids = collect_entity_ids(&values);
    if ids.len() < values.len() {
        tracing::debug!(
            skipped = values.len() - ids.len(),
            "Skipped malformed wikidata values"
        );
    }
    Ok(ids)
}

/// Quote a possibly schema-qualified table name for interpolation into SQL
pub fn quote_table_name(name: &str) -> Result<String, StoreError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 || parts.iter().any(|p| p.is_empty() || p.contains('\0')) {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    Ok(parts
        .iter()
        .map(|p| format!("\"{}\"", p.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join("."))
}

/// Single statement returning the distinct candidate ids across all tables
pub fn build_extract_query(tables: &[String]) -> Result<String, StoreError> {
    let selects = tables
        .iter()
        .map(|table| {
            quote_table_name(table).map(|quoted| {
                format!(
                    "SELECT tags->'wikidata' AS id FROM {} WHERE tags ? 'wikidata'",
                    quoted
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "SELECT DISTINCT id FROM ({}) AS t WHERE id ~ '{}'",
        selects.join(" UNION "),
        WIKIDATA_ID_PATTERN
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_entity_ids_sorts_and_dedups() {
        let ids = collect_entity_ids([
            "Q64",
            "Q42",
            "Q7786526-garbage",
            "Q64",
            "Q0",
            "QABC",
            "",
            "Q",
            "Q100",
        ]);
        let values: Vec<i64> = ids.into_iter().map(EntityId::value).collect();
        assert_eq!(values, vec![42, 64, 100]);
    }

    #[test]
    fn test_collect_sorts_numerically() {
        // Lexically "Q100" < "Q9"
        let ids = collect_entity_ids(vec!["Q100".to_string(), "Q9".to_string()]);
        let values: Vec<i64> = ids.into_iter().map(EntityId::value).collect();
        assert_eq!(values, vec![9, 100]);
    }

    #[test]
    fn test_quote_table_name() {
        assert_eq!(quote_table_name("osm_poi").unwrap(), "\"osm_poi\"");
        assert_eq!(
            quote_table_name("import.osm_poi").unwrap(),
            "\"import\".\"osm_poi\""
        );
        assert_eq!(quote_table_name("we\"ird").unwrap(), "\"we\"\"ird\"");
        assert!(quote_table_name("").is_err());
        assert!(quote_table_name("a..b").is_err());
        assert!(quote_table_name("a.b.c").is_err());
    }

    #[test]
    fn test_build_extract_query() {
        let sql =
            build_extract_query(&["osm_poi".to_string(), "osm_water_name".to_string()]).unwrap();
        assert_eq!(
            sql,
            "SELECT DISTINCT id FROM (\
             SELECT tags->'wikidata' AS id FROM \"osm_poi\" WHERE tags ? 'wikidata' \
             UNION \
             SELECT tags->'wikidata' AS id FROM \"osm_water_name\" WHERE tags ? 'wikidata'\
             ) AS t WHERE id ~ '^Q[1-9][0-9]{0,18}$'"
        );
    }
}

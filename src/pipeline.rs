//! Import orchestration
//!
//! Runs the stages strictly in order:
//!
//! ```text
//!   tables -> extract ids -> reset destination -> per batch: resolve, insert
//! ```
//!
//! Batches are never run concurrently. The destination is truncated before
//! the first request, so a failed run leaves only the batches that finished
//! before the failure.

use std::path::Path;

use crate::config::TableSource;
use crate::error::ImportError;
use crate::store::{extract_ids, LabelStore};
use crate::tileset::scan_tileset;
use crate::wikidata::{batches, LabelSource};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub tables: usize,
    /// Distinct valid ids found in the source tables
    pub ids: usize,
    pub batches: usize,
    /// Rows written to the destination (ids with at least one label)
    pub rows: u64,
    /// Individual language labels written
    pub labels: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stored {} labels for {} of {} wikidata ids from {} tables ({} batches)",
            self.labels, self.rows, self.ids, self.tables, self.batches
        )
    }
}

/// Turn the configured source into a non-empty table list
pub fn resolve_tables(source: &TableSource) -> Result<Vec<String>, ImportError> {
    match source {
        TableSource::Explicit(tables) if !tables.is_empty() => Ok(tables.clone()),
        TableSource::Explicit(_) => Err(ImportError::NoTableSource),
        TableSource::Tileset(path) => discover_tables(path),
    }
}

fn discover_tables(path: &Path) -> Result<Vec<String>, ImportError> {
    let tables = scan_tileset(path)?;
    if tables.is_empty() {
        return Err(ImportError::NoTablesFound {
            tileset: path.to_path_buf(),
        });
    }
    Ok(tables)
}

pub struct ImportPipeline<'a, S: ?Sized, L: ?Sized> {
    store: &'a S,
    source: &'a L,
}

impl<'a, S, L> ImportPipeline<'a, S, L>
where
    S: LabelStore + ?Sized,
    L: LabelSource + ?Sized,
{
    pub fn new(store: &'a S, source: &'a L) -> Self {
        Self { store, source }
    }

    /// Resolve every wikidata id referenced by `tables` and reload the destination
    pub async fn run(&self, tables: &[String]) -> Result<ImportSummary, ImportError> {
        if tables.is_empty() {
            return Err(ImportError::NoTableSource);
        }

        let ids = extract_ids(self.store, tables).await?;
        tracing::info!(
            "Found {} distinct wikidata ids in {} tables",
            ids.len(),
            tables.len()
        );

        self.store.reset().await?;

        let mut summary = ImportSummary {
            tables: tables.len(),
            ids: ids.len(),
            batches: ids.len().div_ceil(crate::wikidata::BATCH_SIZE),
            ..Default::default()
        };

        for (index, batch) in batches(&ids).enumerate() {
            let labels = self.source.fetch_labels(batch).await?;
            let rows = self.store.insert_labels(&labels).await?;

            summary.rows += rows;
            summary.labels += labels.values().map(|record| record.len()).sum::<usize>();

            tracing::info!(
                "Batch {}/{}: {} ids, {} with labels",
                index + 1,
                summary.batches,
                batch.len(),
                rows
            );
        }

        tracing::info!("{}", summary);
        Ok(summary)
    }
}

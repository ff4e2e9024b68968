//! Find tables that carry an hstore `tags` field
//!
//! Walks tileset -> layers -> imposm3 mappings -> tables and keeps the
//! tables whose field list contains `tags: hstore_tags`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::types::{ImposmMapping, LayerFile, TableMapping, TilesetFile};
use crate::error::TilesetError;

/// Prefix imposm adds to every table it creates
pub const TABLE_PREFIX: &str = "osm_";

const TAGS_FIELD: &str = "tags";
const HSTORE_TAGS: &str = "hstore_tags";

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, TilesetError> {
    let content = fs::read_to_string(path).map_err(|source| TilesetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| TilesetError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    base.parent().unwrap_or(Path::new(".")).join(path)
}

/// Load every imposm3 mapping referenced by a tileset file
pub fn load_mappings(tileset_path: &Path) -> Result<Vec<ImposmMapping>, TilesetError> {
    let tileset: TilesetFile = read_yaml(tileset_path)?;
    tracing::debug!(
        tileset = tileset.tileset.name.as_deref().unwrap_or("<unnamed>"),
        layers = tileset.tileset.layers.len(),
        "Loaded tileset"
    );

    let mut mappings = Vec::new();
    for layer_ref in &tileset.tileset.layers {
        let layer_path = relative_to(tileset_path, layer_ref.path());
        let layer: LayerFile = read_yaml(&layer_path)?;

        for datasource in layer.datasources.iter().filter(|d| d.is_imposm()) {
            let Some(mapping_file) = &datasource.mapping_file else {
                continue;
            };
            let mapping_path = relative_to(&layer_path, mapping_file);
            if !mapping_path.exists() {
                return Err(TilesetError::MissingMapping {
                    layer: layer.layer.id.clone(),
                    path: mapping_path,
                });
            }
            mappings.push(read_yaml(&mapping_path)?);
        }
    }

    Ok(mappings)
}

/// Whether a table should have its wikidata tags resolved
pub fn table_qualifies(table: &TableMapping) -> bool {
    if table.resolve_wikidata == Some(false) {
        return false;
    }
    table.field_list().iter().any(|field| {
        field.name.as_deref() == Some(TAGS_FIELD) && field.kind.as_deref() == Some(HSTORE_TAGS)
    })
}

/// Sorted, de-duplicated `osm_*` tables across all mappings
pub fn find_tables<'a>(mappings: impl IntoIterator<Item = &'a ImposmMapping>) -> Vec<String> {
    let tables: BTreeSet<String> = mappings
        .into_iter()
        .flat_map(|mapping| mapping.tables.iter())
        .filter(|(_, table)| table_qualifies(table))
        .map(|(name, _)| format!("{}{}", TABLE_PREFIX, name))
        .collect();
    tables.into_iter().collect()
}

/// Discover tables from a tileset file and list them in the log
pub fn scan_tileset(tileset_path: &Path) -> Result<Vec<String>, TilesetError> {
    let mappings = load_mappings(tileset_path)?;
    let tables = find_tables(&mappings);

    tracing::info!(
        "Found {} tables with an hstore tags field in {}",
        tables.len(),
        tileset_path.display()
    );
    for table in &tables {
        tracing::info!("  * {}", table);
    }

    Ok(tables)
}

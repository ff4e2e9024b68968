//! Tileset, layer and imposm mapping file types
//!
//! Only the keys needed to locate tables and their fields are modelled;
//! everything else in these files is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root of a tileset definition (`openmaptiles.yaml`)
#[derive(Debug, Clone, Deserialize)]
pub struct TilesetFile {
    pub tileset: TilesetDef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TilesetDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layers: Vec<LayerRef>,
}

/// A layer entry: either a bare path or `{ file: path, ... }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayerRef {
    Path(PathBuf),
    Entry { file: PathBuf },
}

impl LayerRef {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Path(path) | Self::Entry { file: path } => path,
        }
    }
}

/// A layer definition file (`layers/poi/poi.yaml`)
#[derive(Debug, Clone, Deserialize)]
pub struct LayerFile {
    pub layer: LayerMeta,
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerMeta {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Datasource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,
}

impl Datasource {
    pub fn is_imposm(&self) -> bool {
        self.kind == "imposm3"
    }
}

/// An imposm3 mapping file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImposmMapping {
    #[serde(default)]
    pub tables: BTreeMap<String, TableMapping>,
}

/// One table definition inside a mapping
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableMapping {
    /// Current imposm key for the field list
    #[serde(default)]
    pub fields: Option<Vec<FieldDef>>,
    /// Older imposm key for the field list
    #[serde(default)]
    pub columns: Option<Vec<FieldDef>>,
    /// Set to `false` to keep this table out of wikidata resolution
    #[serde(rename = "_resolve_wikidata", default)]
    pub resolve_wikidata: Option<bool>,
}

impl TableMapping {
    /// Field list, preferring `fields` over `columns`
    pub fn field_list(&self) -> &[FieldDef] {
        self.fields
            .as_deref()
            .or(self.columns.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

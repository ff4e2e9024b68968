//! OSM Wikidata labels
//!
//! Enriches an imposm-loaded OpenStreetMap database with multilingual names
//! taken from Wikidata. Rows whose `tags` hstore carries a `wikidata=Q<id>`
//! reference are collected, their labels are fetched from the Wikidata
//! query service, and the result is stored as one `(id, labels hstore)`
//! row per entity.
//!
//! # Architecture
//!
//! ```text
//!   tileset.yaml ──► tileset::scan_tileset ──► osm_* tables
//!                                                  │
//!                                                  ▼
//!                              store::extract_ids (one UNION query)
//!                                                  │ sorted ids
//!                                                  ▼
//!              wikidata::batches ──► LabelSource::fetch_labels (SPARQL)
//!                                                  │ id -> {name:<lang>: label}
//!                                                  ▼
//!                              LabelStore::insert_labels (wd_names)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let tables = resolve_tables(&config.tables)?;
//! let pool = config.database.connect().await?;
//! let store = PgLabelStore::new(pool, &config.storage_table)?;
//! let client = WikidataClient::new(&config.resolver)?;
//! let summary = ImportPipeline::new(&store, &client).run(&tables).await?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod tileset;
pub mod wikidata;

pub use config::{DatabaseConfig, ImportConfig, ResolverConfig, TableSource};
pub use error::{ImportError, ResolveError, StoreError, TilesetError};
pub use pipeline::{resolve_tables, ImportPipeline, ImportSummary};
#[cfg(feature = "database")]
pub use store::PgLabelStore;
pub use store::{collect_entity_ids, extract_ids, LabelStore};
pub use wikidata::{EntityId, LabelBatch, LabelRecord, LabelSource, WikidataClient, BATCH_SIZE};
